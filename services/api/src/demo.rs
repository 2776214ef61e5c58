use crate::infra::parse_date;
use chrono::{Datelike, Local, NaiveDate};
use clap::Args;
use marina_dock::config::{AppConfig, PlannerConfig};
use marina_dock::error::AppError;
use marina_dock::workflows::dock::{
    parse_roster, ApplicationCategory, ApplicationSubmission, DockPlanningService, Member,
    MemberId, MemoryStore, NewSeason, Season, SeasonStatus, SegmentSlots, Selection, StoredPlan,
};
use std::collections::HashMap;
use std::fs::File;
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Arc;

const SAMPLE_ROSTER: &str = "\
member_id,member_name,seniority,category,boat_name,boat_length,boat_type,boat_registration,insurance_coverage,insurance_notes
m-101,Avery Lindqvist,3,renewal_same,Halcyon,42,sail,WA-1042-HL,1000000,
m-102,Jordan Okafor,7,renewal_larger,Second Wind,36,sail,WA-2210-SW,750000,upgraded from 28 ft
m-103,Sam Ferreira,1,renewal_same,Tern,28,power,WA-0311-TN,500000,
m-104,Riley Chen,12,new,Blue Heron,55,sail,WA-7781-BH,2000000,
m-105,Morgan Patel,5,renewal_same,Kittiwake,31,power,WA-5520-KW,500000,
m-106,Casey Moreau,9,new,Drifter,47,sail,WA-9034-DR,1000000,
";

type MemoryService = DockPlanningService<MemoryStore>;

#[derive(Args, Debug)]
pub(crate) struct PlanArgs {
    /// Roster CSV with one application per member
    #[arg(long)]
    pub(crate) roster: PathBuf,
    /// Season date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Print the stored plan as JSON instead of the berth listing
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Season date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Stop after planning instead of running the bumping party
    #[arg(long)]
    pub(crate) skip_bumping: bool,
}

pub(crate) fn run_plan(args: PlanArgs) -> Result<(), AppError> {
    let PlanArgs {
        roster,
        today,
        json,
    } = args;

    let config = AppConfig::load()?;
    let submissions = parse_roster(File::open(&roster)?)?;
    let today = today.unwrap_or_else(|| Local::now().date_naive());
    let (service, season) = open_season(&config.planner, today)?;

    for submission in submissions {
        service.submit_application(&season.id, submission)?;
    }
    service.set_season_status(&season.id, SeasonStatus::ApplicationsClosed)?;
    let stored = service.plan_season(&season.id)?;

    if json {
        match serde_json::to_string_pretty(&stored) {
            Ok(json) => println!("{json}"),
            Err(err) => println!("Plan payload unavailable: {err}"),
        }
        return Ok(());
    }

    render_plan(&stored, &service.slot_map(&season.id)?);
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        today,
        skip_bumping,
    } = args;

    let config = AppConfig::load()?;
    let today = today.unwrap_or_else(|| Local::now().date_naive());
    let (service, season) = open_season(&config.planner, today)?;

    println!("Marina dock planning demo ({})", season.id);
    println!("\nApplication intake");
    let submissions = parse_roster(Cursor::new(SAMPLE_ROSTER))?;
    for submission in submissions {
        let application = service.submit_application(&season.id, submission)?;
        println!(
            "  {} | {} | seniority {} | {} | {} ft",
            application.id,
            application.member.name,
            application.member.seniority,
            application.category.label(),
            application.boat.length.feet()
        );
    }

    match service.submit_application(&season.id, underinsured_submission()) {
        Ok(application) => println!("  {} accepted unexpectedly", application.id),
        Err(err) => println!("  Submission rejected: {err}"),
    }

    let stats = service.stats(&season.id)?;
    println!(
        "  {} applications on file ({} pending)",
        stats.total, stats.pending
    );

    service.set_season_status(&season.id, SeasonStatus::ApplicationsClosed)?;
    let stored = service.plan_season(&season.id)?;
    let slots = service.slot_map(&season.id)?;
    render_plan(&stored, &slots);

    if skip_bumping {
        return Ok(());
    }

    println!("\nBumping party");
    let berths: HashMap<_, _> = slots
        .iter()
        .flat_map(|segment| {
            segment.berths.iter().map(move |berth| {
                (
                    berth.application_id.clone(),
                    (segment.segment.id, berth.position),
                )
            })
        })
        .collect();

    service.start_bumping(&season.id)?;
    for entry in &stored.plan.admitted {
        let Some(&(segment, position)) = berths.get(&entry.application_id) else {
            continue;
        };
        let outcome = service.confirm_selection(
            &season.id,
            Selection {
                application_id: entry.application_id.clone(),
                segment,
                position,
            },
        )?;
        println!(
            "  Turn {}: {} confirmed {} at {} ft",
            outcome.state.cursor,
            entry.member_name,
            outcome.assignment.segment.as_str(),
            outcome.assignment.position
        );
    }

    let overview = service.bumping_overview(&season.id)?;
    let season = service.season(&season.id)?;
    println!(
        "  {} berths locked | season status: {}",
        overview.assignments.len(),
        season.status.label()
    );

    Ok(())
}

fn open_season(
    planner: &PlannerConfig,
    today: NaiveDate,
) -> Result<(MemoryService, Season), AppError> {
    let service = DockPlanningService::new(Arc::new(MemoryStore::default()), planner);
    let season = service.create_season(NewSeason {
        year: today.year(),
        application_start: today,
        application_end: today,
        bumping_date: None,
    })?;
    let season = service.set_season_status(&season.id, SeasonStatus::AcceptingApplications)?;
    Ok((service, season))
}

fn underinsured_submission() -> ApplicationSubmission {
    ApplicationSubmission {
        member: Member {
            id: MemberId("m-107".to_string()),
            name: "Quinn Abernathy".to_string(),
            seniority: 15,
        },
        category: ApplicationCategory::New,
        boat_name: "Lark".to_string(),
        boat_length: 24,
        boat_type: "sail".to_string(),
        boat_registration: "WA-4410-LK".to_string(),
        insurance_coverage: 250_000,
        insurance_notes: None,
    }
}

fn render_plan(stored: &StoredPlan, slots: &[SegmentSlots]) {
    let plan = &stored.plan;
    println!("\nDock plan for {}", stored.season_id);
    println!(
        "- {} boats admitted | {} ft of boats | pump-out zone starts at {} ft",
        plan.max_boats, plan.total_length, plan.pump_start
    );

    for segment in slots {
        println!(
            "\n{} ({} ft usable)",
            segment.segment.name, segment.segment.length
        );
        if segment.berths.is_empty() {
            println!("  (empty)");
            continue;
        }
        for berth in &segment.berths {
            println!(
                "  {:>4} ft | {} | {} ft boat",
                berth.position, berth.member_name, berth.boat_length
            );
        }
    }

    if plan.waitlist.is_empty() {
        println!("\nWaitlist: none");
    } else {
        println!("\nWaitlist");
        for entry in &plan.waitlist {
            println!(
                "  {} | seniority {} | {} | {} ft",
                entry.member_name,
                entry.seniority,
                entry.category.label(),
                entry.boat_length
            );
        }
    }
}
