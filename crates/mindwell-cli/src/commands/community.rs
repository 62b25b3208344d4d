use clap::Subcommand;
use mindwell_core::ValidationError;

use crate::context::{block_on, print_json, CliResult, Context};

const MAX_POST_CHARS: usize = 1000;

#[derive(Subcommand)]
pub enum CommunityAction {
    /// Read recent posts
    List,
    /// Share a post
    Post {
        content: String,
        /// Name to show; omit to post anonymously
        #[arg(long)]
        author: Option<String>,
    },
}

pub fn run(action: CommunityAction) -> CliResult {
    let ctx = Context::load()?;
    let api = ctx.api()?;

    match action {
        CommunityAction::List => {
            let posts = block_on(api.list_posts())??;
            print_json(&posts)?;
        }
        CommunityAction::Post { content, author } => {
            validate_post(&content)?;
            let post = block_on(api.create_post(&content, author.as_deref()))??;
            print_json(&post)?;
        }
    }
    Ok(())
}

fn validate_post(content: &str) -> Result<(), ValidationError> {
    let content = content.trim();
    if content.is_empty() {
        return Err(ValidationError::Required("content".into()));
    }
    let len = content.chars().count();
    if len > MAX_POST_CHARS {
        return Err(ValidationError::TooLong {
            field: "content".into(),
            max: MAX_POST_CHARS,
            len,
        });
    }
    Ok(())
}
