use chrono::Utc;
use clap::Subcommand;
use mindwell_core::session::refresh_plan;
use mindwell_core::{GatewayError, PlanTier};
use serde_json::json;

use crate::context::{block_on, print_json, CliResult, Context};

#[derive(Subcommand)]
pub enum AuthAction {
    /// Create an account
    Register {
        username: String,
        email: String,
        #[arg(long, env = "MINDWELL_PASSWORD")]
        password: String,
    },
    /// Log in with email (or username) and password
    Login {
        email: String,
        #[arg(long, env = "MINDWELL_PASSWORD")]
        password: String,
    },
    /// Forget the stored login
    Logout,
    /// Show who is logged in
    Status {
        /// Re-check the token and plan with the server
        #[arg(long)]
        refresh: bool,
    },
    /// Confirm an email address with the token from the verification mail
    Verify { token: String },
    /// Send the verification mail again
    ResendVerification { email: String },
}

/// Pick up an existing subscription right after login. A failed lookup
/// leaves the session on Free; `auth status --refresh` can retry it.
fn restore_plan(ctx: &mut Context) -> CliResult<PlanTier> {
    let api = ctx.authed_api()?;
    match block_on(refresh_plan(ctx.session_mut(), &api))? {
        Ok(plan) => Ok(plan),
        Err(e) => {
            tracing::warn!(error = %e, "subscription status unavailable after login");
            Ok(ctx.session().cached_plan())
        }
    }
}

pub fn run(action: AuthAction) -> CliResult {
    let mut ctx = Context::load()?;

    match action {
        AuthAction::Register {
            username,
            email,
            password,
        } => {
            ctx.session_mut().begin_login()?;
            let api = ctx.api()?;
            match block_on(api.register(&username, &email, &password))? {
                Ok(resp) if resp.token.is_some() => {
                    ctx.session_mut().complete_login(resp, Utc::now())?;
                    ctx.save_session()?;
                    println!("Registered and logged in as {username}");
                }
                Ok(resp) => {
                    ctx.session_mut().fail_login();
                    println!(
                        "{}",
                        resp.message
                            .unwrap_or_else(|| "Account created. Check your email to verify it.".into())
                    );
                }
                Err(e) => {
                    ctx.session_mut().fail_login();
                    return Err(e.into());
                }
            }
        }
        AuthAction::Login { email, password } => {
            ctx.session_mut().begin_login()?;
            let api = ctx.api()?;
            match block_on(api.login(&email, &password))? {
                Ok(resp) => {
                    let name = resp.user.username.clone();
                    ctx.session_mut().complete_login(resp, Utc::now())?;
                    let plan = restore_plan(&mut ctx)?;
                    ctx.save_session()?;
                    println!("Logged in as {name} ({})", plan.display_name());
                }
                Err(e) => {
                    ctx.session_mut().fail_login();
                    if let GatewayError::EmailNotVerified { email } = &e {
                        eprintln!("Run `mindwell-cli auth resend-verification {email}` for a new link.");
                    }
                    return Err(e.into());
                }
            }
        }
        AuthAction::Logout => {
            ctx.session_mut().logout();
            ctx.save_session()?;
            println!("Logged out");
        }
        AuthAction::Status { refresh } => {
            if refresh && ctx.session().is_authenticated() {
                let api = ctx.authed_api()?;
                match block_on(api.profile())? {
                    Ok(user) => {
                        ctx.session_mut().refresh_user(user)?;
                        block_on(refresh_plan(ctx.session_mut(), &api))??;
                    }
                    Err(GatewayError::Auth(msg)) => {
                        tracing::info!(%msg, "stored token rejected");
                        ctx.session_mut().logout();
                    }
                    Err(e) => return Err(e.into()),
                }
                ctx.save_session()?;
            }

            let session = ctx.session();
            let now = Utc::now();
            print_json(&json!({
                "state": session.state(),
                "user": session.user(),
                "plan": session.plan_at(now),
                "premium_expires_at": session.premium_expires_at(),
            }))?;
        }
        AuthAction::Verify { token } => {
            let message = block_on(ctx.api()?.verify_email(&token))??;
            println!("{message}");
        }
        AuthAction::ResendVerification { email } => {
            let message = block_on(ctx.api()?.resend_verification(&email))??;
            println!("{message}");
        }
    }
    Ok(())
}
