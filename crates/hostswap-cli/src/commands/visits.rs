use crate::commands::{print_json, Context};
use crate::error::not_found;
use crate::util::{parse_date_arg, parse_visit_id};
use anyhow::{Context as _, Result};
use clap::{ArgAction, Args, Subcommand};
use hostswap_core::domain::{User, Visit, VisitDraft, VisitId};
use hostswap_core::dto::{HostingMatchDto, VisitDto};
use hostswap_core::rules::require_owner;
use hostswap_core::time::now_utc;
use hostswap_store::query::VisitQuery;
use hostswap_store::repo::VisitRules;
use tracing::info;

#[derive(Debug, Subcommand)]
pub enum VisitCommand {
    /// Plan a visit to a zip code
    Add(AddVisitArgs),
    Show(VisitIdArgs),
    List(ListVisitsArgs),
    Delete(VisitIdArgs),
    Restore(VisitIdArgs),
    /// Hostings near a visit that overlap its dates
    Hostings(VisitIdArgs),
}

#[derive(Debug, Args)]
pub struct AddVisitArgs {
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub start: Option<String>,
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub end: Option<String>,
    #[arg(long)]
    pub zipcode: Option<String>,
}

#[derive(Debug, Args)]
pub struct VisitIdArgs {
    pub id: String,
}

#[derive(Debug, Args)]
pub struct ListVisitsArgs {
    #[arg(long, action = ArgAction::SetTrue)]
    pub include_deleted: bool,
    /// Skip visits that already ended
    #[arg(long, action = ArgAction::SetTrue)]
    pub upcoming: bool,
}

pub fn run(ctx: &Context<'_>, command: VisitCommand) -> Result<()> {
    match command {
        VisitCommand::Add(args) => add_visit(ctx, args),
        VisitCommand::Show(args) => show_visit(ctx, args),
        VisitCommand::List(args) => list_visits(ctx, args),
        VisitCommand::Delete(args) => delete_visit(ctx, args),
        VisitCommand::Restore(args) => restore_visit(ctx, args),
        VisitCommand::Hostings(args) => visit_hostings(ctx, args),
    }
}

pub fn add_visit(ctx: &Context<'_>, args: AddVisitArgs) -> Result<()> {
    let user = ctx.booking_user()?;
    let draft = VisitDraft {
        user_id: user.id,
        start_date: parse_date_arg(args.start.as_deref(), "start")?,
        end_date: parse_date_arg(args.end.as_deref(), "end")?,
        zipcode: args.zipcode,
    };
    let rules = VisitRules {
        today: ctx.today()?,
        country: ctx.config.country_code,
    };
    let geocoder = ctx.geocoder()?;

    let visit = ctx
        .store
        .visits()
        .create(now_utc(), draft, &rules, geocoder.as_ref())?;
    info!(visit_id = %visit.id, "visit created");

    if ctx.json {
        print_json(&VisitDto::from(&visit))?;
    } else {
        println!("created {} {}", visit.id, describe(&visit));
    }
    Ok(())
}

pub fn show_visit(ctx: &Context<'_>, args: VisitIdArgs) -> Result<()> {
    let user = ctx.booking_user()?;
    let visit = owned_visit(ctx, &user, parse_visit_id(&args.id)?, false)?;
    let dto = VisitDto::from(&visit);
    if ctx.json {
        return print_json(&dto);
    }

    println!("id: {}", dto.id);
    println!("dates: {}", dto.dates);
    println!("zipcode: {}", dto.zipcode);
    if let Some(city) = dto.city.as_deref() {
        println!("city: {}", city);
    }
    if let Some(state) = dto.state.as_deref() {
        println!("state: {}", state);
    }
    if let (Some(lat), Some(lon)) = (dto.latitude, dto.longitude) {
        println!("location: {:.4}, {:.4}", lat, lon);
    }
    Ok(())
}

pub fn list_visits(ctx: &Context<'_>, args: ListVisitsArgs) -> Result<()> {
    let user = ctx.booking_user()?;
    let query = VisitQuery {
        include_deleted: args.include_deleted,
        ending_on_or_after: if args.upcoming {
            Some(ctx.today()?)
        } else {
            None
        },
        ..VisitQuery::for_user(user.id)
    };
    let visits = ctx.store.visits().list(&query)?;

    if ctx.json {
        let items: Vec<VisitDto> = visits.iter().map(VisitDto::from).collect();
        return print_json(&items);
    }
    if visits.is_empty() {
        println!("no visits");
        return Ok(());
    }
    for visit in visits {
        let deleted = if visit.is_deleted() { " [deleted]" } else { "" };
        println!("{}  {}{}", visit.id, describe(&visit), deleted);
    }
    Ok(())
}

pub fn delete_visit(ctx: &Context<'_>, args: VisitIdArgs) -> Result<()> {
    let user = ctx.booking_user()?;
    let visit = owned_visit(ctx, &user, parse_visit_id(&args.id)?, false)?;
    ctx.store.visits().soft_delete(now_utc(), visit.id)?;
    if ctx.json {
        print_json(&serde_json::json!({ "deleted": visit.id }))?;
    } else {
        println!("deleted {}", visit.id);
    }
    Ok(())
}

pub fn restore_visit(ctx: &Context<'_>, args: VisitIdArgs) -> Result<()> {
    let user = ctx.booking_user()?;
    let visit = owned_visit(ctx, &user, parse_visit_id(&args.id)?, true)?;
    let visit = ctx
        .store
        .visits()
        .restore(now_utc(), visit.id)
        .with_context(|| "restore visit")?;
    if ctx.json {
        print_json(&VisitDto::from(&visit))?;
    } else {
        println!("restored {} {}", visit.id, describe(&visit));
    }
    Ok(())
}

pub fn visit_hostings(ctx: &Context<'_>, args: VisitIdArgs) -> Result<()> {
    let user = ctx.booking_user()?;
    let id = parse_visit_id(&args.id)?;
    let visit = ctx
        .store
        .visits()
        .get(id, false)?
        .ok_or_else(|| not_found("visit not found"))?;
    let policy = ctx.config.match_policy()?;
    let matches = ctx
        .store
        .hostings()
        .available_for_visit(&visit, user.id, &policy)?;

    let unit = policy.unit.as_str();
    if ctx.json {
        let items: Vec<HostingMatchDto> = matches
            .iter()
            .map(|found| HostingMatchDto::new(found, unit))
            .collect();
        return print_json(&items);
    }
    if matches.is_empty() {
        println!("no hostings available for {}", visit.date_range_label());
        return Ok(());
    }
    for found in matches {
        let hosting = &found.hosting;
        println!(
            "{}  {:.1} {}  {}  {} - {}",
            hosting.id,
            found.distance,
            unit,
            hosting.title,
            hosting.start_date.format("%Y-%m-%d"),
            hosting.end_date.format("%Y-%m-%d"),
        );
    }
    Ok(())
}

fn owned_visit(ctx: &Context<'_>, user: &User, id: VisitId, include_deleted: bool) -> Result<Visit> {
    let visit = ctx
        .store
        .visits()
        .get(id, include_deleted)?
        .ok_or_else(|| not_found("visit not found"))?;
    require_owner(user, visit.user_id)?;
    Ok(visit)
}

fn describe(visit: &Visit) -> String {
    let place = visit.city.as_deref().unwrap_or(visit.zipcode.as_str());
    format!("{} {} ({})", visit.date_range_label(), place, visit.zipcode)
}
