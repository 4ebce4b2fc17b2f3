use anyhow::{Context, Result};
use clap::Args;
use kinship_core_types::UserId;
use kinship_recommender::{CandidateUser, Recommender};

use crate::cli::context::CliContext;
use crate::cli::output::OutputFormat;

#[derive(Args, Clone, Debug)]
pub struct RecommendArgs {
    /// User to compute suggestions for
    pub user_id: String,

    /// Cap on returned candidates (defaults to recommendation.max_results)
    #[arg(long)]
    pub limit: Option<usize>,
}

pub async fn cmd_recommend(
    args: RecommendArgs,
    ctx: &CliContext,
    output: OutputFormat,
) -> Result<()> {
    let settings = &ctx.config().recommendation;
    let recommender = Recommender::new(ctx.writer().await?)
        .with_weights(settings.weights())
        .with_max_results(args.limit.or(settings.max_results));

    let subject = UserId::from(args.user_id);
    let candidates = recommender
        .recommend(&subject)
        .await
        .with_context(|| format!("recommending friends for {}", subject))?;

    if !output.emit(&candidates)? {
        print_candidates(&subject, &candidates);
    }
    Ok(())
}

fn print_candidates(subject: &UserId, candidates: &[CandidateUser]) {
    if candidates.is_empty() {
        println!("No suggestions for {}", subject);
        return;
    }
    println!(
        "{:<36} {:<20} {:>6} {:>7} {:>9}",
        "ID", "USERNAME", "SCORE", "MUTUAL", "INTERESTS"
    );
    for candidate in candidates {
        println!(
            "{:<36} {:<20} {:>6} {:>7} {:>9}",
            candidate.id,
            candidate.username,
            candidate.score,
            candidate.mutual_friends,
            candidate.shared_interests
        );
    }
}
