//! # Postbox Binary
//!
//! Headless front end for the submission pipeline: wires configuration and
//! the GraphQL gateway into the orchestrator and drives one submission (or
//! one listing read) per invocation.

use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use secrecy::ExposeSecret;

use configs::{AppConfig, AuthorPolicySetting};
use domains::ports::BoardGateway;
use gateway_adapters::GraphqlGateway;
use services::{
    AuthorPolicy, FixedIdentity, NotificationCenter, PostForm, SubmissionService,
};

#[derive(Parser)]
#[command(name = "postbox", about = "Submit posts to the board backend")]
struct Cli {
    /// Display name used as the post author. Unset means anonymous.
    #[arg(long, env = "POSTBOX_USER", global = true)]
    user: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a post, resolving or creating its category first.
    Submit {
        #[arg(long)]
        title: String,
        #[arg(long)]
        body: Option<String>,
        /// Image URL attached to the post.
        #[arg(long)]
        image: Option<String>,
        /// Topic to post under when not scoped with --in.
        #[arg(long)]
        topic: Option<String>,
        /// Fixed target topic; hides and ignores --topic.
        #[arg(long = "in", value_name = "TOPIC")]
        fixed_topic: Option<String>,
    },
    /// Read the aggregate listing.
    Listing {
        #[arg(long)]
        limit: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load().context("configuration")?;
    tracing::info!(endpoint = %config.gateway.endpoint, "postbox starting");

    // One gateway instance shared by every collaborator.
    let gateway: Arc<dyn BoardGateway> = Arc::new(GraphqlGateway::new(
        config.gateway.endpoint.clone(),
        config.gateway.api_key.expose_secret().into(),
    ));

    match cli.command {
        Command::Submit {
            title,
            body,
            image,
            topic,
            fixed_topic,
        } => {
            let identity = match cli.user {
                Some(name) => FixedIdentity::signed_in(name),
                None => FixedIdentity::signed_out(),
            };
            let notifier = Arc::new(NotificationCenter::new());
            let policy = match config.submission.author_policy {
                AuthorPolicySetting::AllowAnonymous => AuthorPolicy::AllowAnonymous,
                AuthorPolicySetting::RequireIdentity => AuthorPolicy::RequireIdentity,
            };
            let service =
                SubmissionService::new(gateway, Arc::new(identity), notifier.clone())
                    .with_author_policy(policy);

            let mut form = match fixed_topic {
                Some(fixed) => PostForm::scoped(fixed),
                None => PostForm::new(),
            };
            form.set_title(title);
            if let Some(body) = body {
                form.set_body(body);
            }
            if let Some(image) = image {
                form.toggle_image_box();
                form.set_image(image);
            }
            if let Some(topic) = topic {
                form.set_topic_override(topic);
            }

            let receipt = service.submit(&mut form).await?;
            if let Some(note) = notifier.snapshot(receipt.token) {
                println!("{}", note.message);
            }
            println!(
                "post {} created in category {}{}",
                receipt.post_id,
                receipt.category_id,
                if receipt.created_category {
                    " (new category)"
                } else {
                    ""
                }
            );
        }
        Command::Listing { limit } => {
            let limit = limit.unwrap_or(config.gateway.listing_limit);
            let items = gateway.listing(limit).await?;
            for item in items {
                println!(
                    "[{}] {} by {}",
                    item.topic,
                    item.post.title,
                    item.post.author.as_deref().unwrap_or("anonymous"),
                );
            }
        }
    }

    Ok(())
}
