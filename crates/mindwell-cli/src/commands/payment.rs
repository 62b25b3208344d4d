use chrono::Utc;
use clap::Subcommand;
use mindwell_core::gateway::parse_timestamp;
use mindwell_core::session::plan_features;
use mindwell_core::PlanTier;
use serde_json::json;

use crate::context::{block_on, print_json, CliResult, Context};

#[derive(Subcommand)]
pub enum PaymentAction {
    /// Compare the Free and Premium plans
    Plans,
    /// Confirm a completed checkout and upgrade to Premium
    Verify {
        /// Transaction reference from the checkout
        reference: String,
    },
    /// Show the subscription status from the server
    Status,
    /// Cancel Premium
    Cancel,
    /// List past payments
    History,
}

pub fn run(action: PaymentAction) -> CliResult {
    let mut ctx = Context::load()?;

    match action {
        PaymentAction::Plans => {
            let payment = &ctx.config.payment;
            print_json(&json!({
                "current": ctx.session().plan_at(Utc::now()),
                "free": plan_features(PlanTier::Free),
                "premium": plan_features(PlanTier::Premium),
                "price": {
                    "currency": payment.currency,
                    "amount_minor": payment.amount_minor,
                    "per": "month",
                },
            }))?;
        }
        PaymentAction::Verify { reference } => {
            let api = ctx.authed_api()?;
            let verification = block_on(api.verify_payment(&reference))??;
            let expires = verification.expires_at.as_deref().and_then(parse_timestamp);
            ctx.session_mut().payment_verified(expires)?;
            ctx.save_session()?;
            println!("Welcome to Premium! {}", verification.message);
        }
        PaymentAction::Status => {
            let api = ctx.authed_api()?;
            let status = block_on(api.subscription_status())??;
            ctx.session_mut().apply_subscription_status(&status)?;
            ctx.save_session()?;
            print_json(&status)?;
        }
        PaymentAction::Cancel => {
            let api = ctx.authed_api()?;
            let result = block_on(api.cancel_subscription())??;
            if ctx.session().cached_plan() == PlanTier::Premium {
                ctx.session_mut().downgrade()?;
                ctx.save_session()?;
            }
            println!("{}", result.message);
        }
        PaymentAction::History => {
            let api = ctx.authed_api()?;
            let payments = block_on(api.payment_history())??;
            print_json(&payments)?;
        }
    }
    Ok(())
}
