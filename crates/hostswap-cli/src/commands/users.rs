use crate::commands::{print_json, Context};
use crate::error::{invalid_input, not_found};
use crate::util::{normalize_optional_value, parse_user_id};
use anyhow::Result;
use clap::{Args, Subcommand};
use hostswap_core::domain::User;
use hostswap_core::dto::{SessionDto, UserDto};
use hostswap_core::rules::require_owner;
use hostswap_core::time::{format_timestamp_datetime, now_utc};
use hostswap_core::CoreError;
use hostswap_store::repo::{IdentityAssertion, UserNew, UserUpdate};
use tracing::info;

#[derive(Debug, Subcommand)]
pub enum UserCommand {
    /// Register a user and start a session
    Create(CreateUserArgs),
    Show(ShowUserArgs),
    Edit(EditUserArgs),
    /// Confirm an email address with its confirmation token
    #[command(name = "confirm-email")]
    ConfirmEmail(ConfirmEmailArgs),
    /// Sign in with an identity provider assertion
    #[command(name = "sign-in")]
    SignIn(SignInArgs),
    #[command(name = "sign-out")]
    SignOut,
    Whoami,
    Delete,
}

#[derive(Debug, Args)]
pub struct CreateUserArgs {
    #[arg(long)]
    pub uid: String,
    #[arg(long)]
    pub provider: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub first_name: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
}

#[derive(Debug, Args)]
pub struct ShowUserArgs {
    /// Defaults to the signed-in user
    pub id: Option<String>,
}

#[derive(Debug, Args)]
pub struct EditUserArgs {
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub first_name: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
}

#[derive(Debug, Args)]
pub struct ConfirmEmailArgs {
    pub token: String,
}

#[derive(Debug, Args)]
pub struct SignInArgs {
    #[arg(long)]
    pub provider: String,
    #[arg(long)]
    pub uid: String,
    #[arg(long)]
    pub email: Option<String>,
}

pub fn run(ctx: &Context<'_>, command: UserCommand) -> Result<()> {
    match command {
        UserCommand::Create(args) => create_user(ctx, args),
        UserCommand::Show(args) => show_user(ctx, args),
        UserCommand::Edit(args) => edit_user(ctx, args),
        UserCommand::ConfirmEmail(args) => confirm_email(ctx, args),
        UserCommand::SignIn(args) => sign_in(ctx, args),
        UserCommand::SignOut => sign_out(ctx),
        UserCommand::Whoami => whoami(ctx),
        UserCommand::Delete => delete_user(ctx),
    }
}

pub fn create_user(ctx: &Context<'_>, args: CreateUserArgs) -> Result<()> {
    let user = ctx.store.users().create(
        now_utc(),
        UserNew {
            provider: args.provider.and_then(normalize_optional_value),
            uid: args.uid,
            email: args.email,
            first_name: args.first_name,
            phone: args.phone,
            email_confirmed: false,
        },
    )?;
    info!(user_id = %user.id, "user created");
    print_session(ctx, &user)
}

pub fn sign_in(ctx: &Context<'_>, args: SignInArgs) -> Result<()> {
    let user = ctx.store.users().sign_in_with_identity(
        now_utc(),
        IdentityAssertion {
            provider: args.provider,
            uid: args.uid,
            email: args.email.and_then(normalize_optional_value),
        },
    )?;
    print_session(ctx, &user)
}

pub fn sign_out(ctx: &Context<'_>) -> Result<()> {
    let Some(token) = ctx.session else {
        return Err(CoreError::NotSignedIn.into());
    };
    if !ctx.store.users().sign_out(now_utc(), token)? {
        return Err(CoreError::NotSignedIn.into());
    }
    if ctx.json {
        print_json(&serde_json::json!({ "signed_out": true }))?;
    } else {
        println!("signed out");
    }
    Ok(())
}

pub fn whoami(ctx: &Context<'_>) -> Result<()> {
    let user = ctx.current_user()?;
    print_user(ctx, &user)
}

pub fn show_user(ctx: &Context<'_>, args: ShowUserArgs) -> Result<()> {
    let current = ctx.current_user()?;
    let user = match args.id {
        Some(raw) => {
            let id = parse_user_id(&raw)?;
            require_owner(&current, id)?;
            ctx.store
                .users()
                .get(id)?
                .ok_or_else(|| not_found("user not found"))?
        }
        None => current,
    };
    print_user(ctx, &user)
}

pub fn edit_user(ctx: &Context<'_>, args: EditUserArgs) -> Result<()> {
    let current = ctx.current_user()?;

    let mut update = UserUpdate::default();
    if let Some(email) = args.email {
        update.email = Some(normalize_optional_value(email));
    }
    if let Some(first_name) = args.first_name {
        update.first_name = Some(normalize_optional_value(first_name));
    }
    if let Some(phone) = args.phone {
        update.phone = Some(normalize_optional_value(phone));
    }
    if update.email.is_none() && update.first_name.is_none() && update.phone.is_none() {
        return Err(invalid_input("no updates provided"));
    }

    let user = ctx.store.users().update(now_utc(), current.id, update)?;
    if ctx.json {
        print_json(&UserDto::from(&user))?;
    } else {
        println!("updated {}", user.id);
        print_missing(&user);
    }
    Ok(())
}

pub fn confirm_email(ctx: &Context<'_>, args: ConfirmEmailArgs) -> Result<()> {
    let user = ctx
        .store
        .users()
        .activate_email_by_token(now_utc(), &args.token)?;
    if ctx.json {
        print_json(&UserDto::from(&user))?;
    } else {
        println!(
            "confirmed {}",
            user.email.as_deref().unwrap_or("(no email)")
        );
    }
    Ok(())
}

pub fn delete_user(ctx: &Context<'_>) -> Result<()> {
    let user = ctx.current_user()?;
    ctx.store.users().delete(user.id)?;
    info!(user_id = %user.id, "user deleted");
    if ctx.json {
        print_json(&serde_json::json!({ "deleted": user.id }))?;
    } else {
        println!("deleted {}", user.id);
    }
    Ok(())
}

fn print_session(ctx: &Context<'_>, user: &User) -> Result<()> {
    if ctx.json {
        return print_json(&SessionDto::from(user));
    }
    let session = SessionDto::from(user);
    println!("signed in {} ({})", user.id, user.uid);
    println!("session: {}", session.session_token);
    if let Some(token) = session.confirm_token.as_deref() {
        println!("confirmation token: {}", token);
    }
    print_missing(user);
    Ok(())
}

fn print_user(ctx: &Context<'_>, user: &User) -> Result<()> {
    let dto = UserDto::from(user);
    if ctx.json {
        return print_json(&dto);
    }

    println!("id: {}", dto.id);
    println!("uid: {}", dto.uid);
    if let Some(provider) = dto.provider.as_deref() {
        println!("provider: {}", provider);
    }
    if let Some(first_name) = dto.first_name.as_deref() {
        println!("first_name: {}", first_name);
    }
    if let Some(email) = dto.email.as_deref() {
        let status = if dto.email_confirmed {
            "confirmed"
        } else {
            "unconfirmed"
        };
        println!("email: {} ({})", email, status);
    }
    if let Some(phone) = dto.phone.as_deref() {
        println!("phone: {}", phone);
    }
    println!("created_at: {}", format_timestamp_datetime(dto.created_at));
    print_missing(user);
    Ok(())
}

fn print_missing(user: &User) {
    let missing = user.missing_profile_fields();
    if !missing.is_empty() {
        println!("profile incomplete, missing: {}", missing.join(", "));
    }
}
