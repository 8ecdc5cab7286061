use crate::infra::load_from_config;
use clap::Args;
use dse_cutoffs::attempts::percentage_of;
use dse_cutoffs::config::AppConfig;
use dse_cutoffs::cutoffs::{
    classify, current_exam_year, generic_fallback_table, has_subject_cutoff_data,
    resolve_boundaries, BoundaryRow, BoundarySource, LoadedCutoffs,
};
use dse_cutoffs::error::AppError;

#[derive(Args, Debug)]
#[command(group(
    clap::ArgGroup::new("input")
        .required(true)
        .args(["percentage", "score"])
))]
pub(crate) struct EstimateArgs {
    /// Subject code, e.g. ENG or PHY
    #[arg(long)]
    pub(crate) subject: String,
    /// Percentage score (0-100)
    #[arg(long)]
    pub(crate) percentage: Option<f64>,
    /// Raw score; requires --total
    #[arg(long, requires = "total")]
    pub(crate) score: Option<f64>,
    /// Paper total for --score
    #[arg(long)]
    pub(crate) total: Option<f64>,
    /// Exam year (defaults to the current year)
    #[arg(long)]
    pub(crate) year: Option<i32>,
}

async fn load_cutoffs() -> Result<LoadedCutoffs, AppError> {
    let config = AppConfig::load()?;
    Ok(load_from_config(&config.cutoffs).await)
}

pub(crate) async fn run_estimate(args: EstimateArgs) -> Result<(), AppError> {
    let EstimateArgs {
        subject,
        percentage,
        score,
        total,
        year,
    } = args;

    let percentage = match (percentage, score, total) {
        (Some(pct), _, _) => pct,
        (None, Some(score), Some(total)) => percentage_of(score, total)?,
        _ => {
            return Err(AppError::InvalidRequest(
                "provide --percentage or --score with --total".to_string(),
            ))
        }
    };

    let loaded = load_cutoffs().await?;
    let exam_year = year.unwrap_or_else(current_exam_year);
    let resolved = resolve_boundaries(&loaded.store, &subject, exam_year);
    let estimate = classify(resolved.rows, percentage);

    println!(
        "{} {} at {:.1}% -> estimated level {}",
        subject.trim().to_uppercase(),
        exam_year,
        percentage,
        estimate
    );
    println!("Boundaries: {}", describe_source(resolved.source));
    render_boundaries(resolved.rows);

    if loaded.using_generic_fallback {
        println!("\nSubject-specific cutoffs unavailable; generic cutoffs in use.");
    } else if !has_subject_cutoff_data(&loaded.store, &subject, Some(exam_year)) {
        println!("\nNo cutoff data for this subject and year. Enter the grade manually.");
    }

    Ok(())
}

pub(crate) async fn run_inspect() -> Result<(), AppError> {
    let loaded = load_cutoffs().await?;

    if loaded.using_generic_fallback {
        println!("Using generic cutoffs. Subject-specific data unavailable.");
        return Ok(());
    }

    println!("Subject cutoffs ({} subjects)", loaded.store.len());
    for (code, table) in loaded.store.subjects() {
        if table.is_legacy() {
            println!("- {code}: single table (no exam year)");
            continue;
        }
        let years: Vec<String> = table.years().map(|year| year.to_string()).collect();
        if years.is_empty() {
            println!("- {code}: no rows");
        } else {
            println!("- {code}: {}", years.join(", "));
        }
    }

    Ok(())
}

pub(crate) fn run_generic() {
    println!("Generic fallback cutoffs");
    render_boundaries(generic_fallback_table());
}

fn describe_source(source: BoundarySource) -> String {
    match source {
        BoundarySource::ExactYear { year } => format!("{year} subject table"),
        BoundarySource::NearestYear { requested, used } => {
            format!("nearest available year {used} (no table for {requested})")
        }
        BoundarySource::Generic => "generic fallback table".to_string(),
    }
}

fn render_boundaries(rows: &[BoundaryRow]) {
    for row in rows {
        println!("- {:>3}: {}%", row.level.as_str(), row.minimum_percentage);
    }
}
