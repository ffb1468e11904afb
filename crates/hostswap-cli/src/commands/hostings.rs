use crate::commands::{print_json, Context};
use crate::error::{invalid_input, not_found};
use crate::util::{parse_date_arg, parse_hosting_id};
use anyhow::Result;
use clap::{ArgAction, Args, Subcommand};
use hostswap_core::domain::{normalize_zipcode, GeoPoint, Hosting, HostingDraft};
use hostswap_core::dto::{HostingDto, HostingMatchDto};
use hostswap_core::rules::{
    apply_geocode, lookup_zipcode, require_owner, GeocodeOutcome, ValidationErrors,
};
use hostswap_core::time::now_utc;
use hostswap_core::CoreError;
use tracing::{info, warn};

#[derive(Debug, Subcommand)]
pub enum HostingCommand {
    /// Offer a place for a date range
    Add(AddHostingArgs),
    List(ListHostingsArgs),
    Delete(DeleteHostingArgs),
}

#[derive(Debug, Args)]
pub struct AddHostingArgs {
    #[arg(long)]
    pub title: String,
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub start: Option<String>,
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub end: Option<String>,
    /// Geocoded unless --lat/--lon are given
    #[arg(long)]
    pub zipcode: Option<String>,
    #[arg(long, requires = "lon", allow_negative_numbers = true)]
    pub lat: Option<f64>,
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    pub lon: Option<f64>,
}

#[derive(Debug, Args)]
pub struct ListHostingsArgs {
    /// Only my hostings
    #[arg(long, action = ArgAction::SetTrue)]
    pub mine: bool,
    /// Hostings within the configured radius of a zip code
    #[arg(long, value_name = "ZIPCODE", conflicts_with = "mine")]
    pub near: Option<String>,
}

#[derive(Debug, Args)]
pub struct DeleteHostingArgs {
    pub id: String,
}

pub fn run(ctx: &Context<'_>, command: HostingCommand) -> Result<()> {
    match command {
        HostingCommand::Add(args) => add_hosting(ctx, args),
        HostingCommand::List(args) => list_hostings(ctx, args),
        HostingCommand::Delete(args) => delete_hosting(ctx, args),
    }
}

pub fn add_hosting(ctx: &Context<'_>, args: AddHostingArgs) -> Result<()> {
    let user = ctx.booking_user()?;
    let location = match (args.lat, args.lon) {
        (Some(lat), Some(lon)) => Some(GeoPoint::new(lat, lon)),
        _ => None,
    };
    let draft = HostingDraft {
        host_id: user.id,
        title: args.title,
        zipcode: args.zipcode,
        start_date: parse_date_arg(args.start.as_deref(), "start")?,
        end_date: parse_date_arg(args.end.as_deref(), "end")?,
        location,
    };
    let geocoder = ctx.geocoder()?;
    let hosting = ctx.store.hostings().create(
        now_utc(),
        draft,
        ctx.config.country_code,
        geocoder.as_ref(),
    )?;
    info!(hosting_id = %hosting.id, "hosting created");

    if ctx.json {
        print_json(&HostingDto::from(&hosting))?;
    } else {
        println!("created {} {}", hosting.id, describe(&hosting));
    }
    Ok(())
}

pub fn list_hostings(ctx: &Context<'_>, args: ListHostingsArgs) -> Result<()> {
    let user = ctx.booking_user()?;

    if let Some(zipcode) = args.near {
        let zipcode = normalize_zipcode(&zipcode);
        if zipcode.is_empty() {
            return Err(invalid_input("--near needs a zip code"));
        }
        let geocoder = ctx.geocoder()?;
        let outcome = lookup_zipcode(geocoder.as_ref(), &zipcode);
        log_unavailable(geocoder.backend_name(), &zipcode, &outcome);
        let mut errors = ValidationErrors::default();
        let Some(place) = apply_geocode(Some(&zipcode), &outcome, &mut errors) else {
            return Err(CoreError::Invalid(errors).into());
        };

        let policy = ctx.config.match_policy()?;
        let matches = ctx
            .store
            .hostings()
            .nearby(place.point(), policy.radius, policy.unit, None)?;
        let unit = policy.unit.as_str();
        if ctx.json {
            let items: Vec<HostingMatchDto> = matches
                .iter()
                .map(|found| HostingMatchDto::new(found, unit))
                .collect();
            return print_json(&items);
        }
        if matches.is_empty() {
            println!("no hostings near {}", zipcode);
        }
        for found in matches {
            println!(
                "{}  {:.1} {}  {}",
                found.hosting.id,
                found.distance,
                unit,
                describe(&found.hosting)
            );
        }
        return Ok(());
    }

    let host = if args.mine { Some(user.id) } else { None };
    let hostings = ctx.store.hostings().list(host)?;
    if ctx.json {
        let items: Vec<HostingDto> = hostings.iter().map(HostingDto::from).collect();
        return print_json(&items);
    }
    if hostings.is_empty() {
        println!("no hostings");
    }
    for hosting in hostings {
        println!("{}  {}", hosting.id, describe(&hosting));
    }
    Ok(())
}

pub fn delete_hosting(ctx: &Context<'_>, args: DeleteHostingArgs) -> Result<()> {
    let user = ctx.booking_user()?;
    let id = parse_hosting_id(&args.id)?;
    let hosting = ctx
        .store
        .hostings()
        .get(id)?
        .ok_or_else(|| not_found("hosting not found"))?;
    require_owner(&user, hosting.host_id)?;
    ctx.store.hostings().delete(hosting.id)?;
    if ctx.json {
        print_json(&serde_json::json!({ "deleted": hosting.id }))?;
    } else {
        println!("deleted {}", hosting.id);
    }
    Ok(())
}

fn log_unavailable(backend: &str, zipcode: &str, outcome: &GeocodeOutcome) {
    if let GeocodeOutcome::Unavailable(err) = outcome {
        warn!(
            zipcode = %zipcode,
            backend,
            error = %err,
            "geocoder unavailable, treating as no results"
        );
    }
}

fn describe(hosting: &Hosting) -> String {
    let place = hosting
        .city
        .as_deref()
        .or(hosting.zipcode.as_deref())
        .unwrap_or("-");
    format!(
        "{} in {} {} - {}",
        hosting.title,
        place,
        hosting.start_date.format("%Y-%m-%d"),
        hosting.end_date.format("%Y-%m-%d")
    )
}
