use std::io::IsTerminal;

use chrono::{Duration, Utc};
use owo_colors::OwoColorize;
use terminal_size::{terminal_size, Width};

use crate::admin::{AuditLog, EntityStatus, Hierarchy};
use crate::analysis::{BigJobSummary, OutcomeEvolution, OutcomeRow, SparkPoint};
use crate::dataset::ResearchRound;
use crate::scoring::{OpportunityLevel, ScoreResult};

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate text to fit available width, accounting for Unicode
fn truncate(text: &str, max_width: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max_width {
        text.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

/// Width left for a free-text column after `fixed_width` columns
fn name_width(fixed_width: usize) -> Option<usize> {
    get_terminal_width().map(|width| {
        if width > fixed_width + 10 {
            width - fixed_width
        } else {
            20
        }
    })
}

/// Scores are shown with one decimal
pub fn format_score(score: f64) -> String {
    format!("{:.1}", score)
}

/// Level padded to a fixed 6-char column, red/yellow/green when colored
pub fn format_level(level: OpportunityLevel, use_colors: bool) -> String {
    let text = format!("{:<6}", level.as_str());
    if !use_colors {
        return text;
    }
    match level {
        OpportunityLevel::High => text.red().bold().to_string(),
        OpportunityLevel::Medium => text.yellow().to_string(),
        OpportunityLevel::Low => text.green().to_string(),
    }
}

pub fn format_score_result(result: &ScoreResult, use_colors: bool) -> String {
    format!(
        "Opportunity score: {}  Level: {}  ({})",
        format_score(result.score),
        format_level(result.level, use_colors).trim_end(),
        result.level.zone_label()
    )
}

/// One line per round: id, date, name, description
pub fn format_rounds(rounds: &[ResearchRound], use_colors: bool) -> String {
    if rounds.is_empty() {
        return "No research rounds found.".to_string();
    }

    rounds
        .iter()
        .map(|r| {
            if use_colors {
                format!(
                    "{:<8}  {}  {}  {}",
                    r.id.bold(),
                    r.date.dimmed(),
                    r.name.cyan(),
                    r.description
                )
            } else {
                format!("{:<8}  {}  {}  {}", r.id, r.date, r.name, r.description)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Outcome table for one round.
/// Columns: index, opportunity, level, importance, satisfaction, name (id)
pub fn format_round_table(rows: &[OutcomeRow], use_colors: bool) -> String {
    if rows.is_empty() {
        return "No outcomes found.".to_string();
    }

    // "99." + score 5 + level 6 + imp 4 + sat 4, two-space separators
    let fixed_width = 3 + 2 + 5 + 2 + 6 + 2 + 4 + 2 + 4 + 2;
    let width = name_width(fixed_width);

    rows.iter()
        .enumerate()
        .map(|(idx, row)| {
            let index_str = format!("{:>2}.", idx + 1);
            let label = format!("{} ({})", row.name, row.id);
            let label = match width {
                Some(w) => truncate(&label, w),
                None => label,
            };
            let score = format!("{:>5}", format_score(row.opportunity_score));
            let importance = format!("{:>4.1}", row.importance);
            let satisfaction = format!("{:>4.1}", row.satisfaction);

            if use_colors {
                format!(
                    "{}  {}  {}  {}  {}  {}",
                    index_str.dimmed(),
                    score.bold(),
                    format_level(row.level(), true),
                    importance,
                    satisfaction,
                    label
                )
            } else {
                format!(
                    "{}  {}  {}  {}  {}  {}",
                    index_str,
                    score,
                    format_level(row.level(), false),
                    importance,
                    satisfaction,
                    label
                )
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn summary_line(
    indent: &str,
    average: Option<f64>,
    level: Option<OpportunityLevel>,
    outcomes: usize,
    high: usize,
    label: &str,
    use_colors: bool,
) -> String {
    let avg = format!("{:>5}", average.map_or("-".to_string(), format_score));
    let level = match level {
        Some(level) => format_level(level, use_colors),
        None => format!("{:<6}", "-"),
    };
    let counts = format!("{:>2} outcomes, {} high", outcomes, high);
    if use_colors {
        format!("{}{}  {}  {}  {}", indent, avg.bold(), level, counts.dimmed(), label)
    } else {
        format!("{}{}  {}  {}  {}", indent, avg, level, counts, label)
    }
}

/// Per-job averages of one round, big jobs with their little jobs indented.
pub fn format_job_summaries(summaries: &[BigJobSummary], use_colors: bool) -> String {
    if summaries.is_empty() {
        return "No jobs found.".to_string();
    }

    let mut lines = Vec::new();
    for bj in summaries {
        let label = format!("{} ({})", bj.name, bj.id);
        let label = if use_colors { label.bold().to_string() } else { label };
        lines.push(summary_line(
            "",
            bj.average_opportunity,
            bj.level(),
            bj.outcome_count,
            bj.high_count,
            &label,
            use_colors,
        ));
        for lj in &bj.little_jobs {
            lines.push(summary_line(
                "  ",
                lj.average_opportunity,
                lj.level(),
                lj.outcome_count,
                lj.high_count,
                &format!("{} ({})", lj.name, lj.id),
                use_colors,
            ));
        }
    }
    lines.join("\n")
}

/// Cross-round table, at most `top` rows.
/// Columns: index, average opportunity, change, current, level, name
pub fn format_evolution_table(evolutions: &[OutcomeEvolution], top: usize, use_colors: bool) -> String {
    if evolutions.is_empty() {
        return "No outcomes found.".to_string();
    }

    let fixed_width = 3 + 2 + 5 + 2 + 5 + 2 + 5 + 2 + 6 + 2;
    let width = name_width(fixed_width);

    evolutions
        .iter()
        .take(top)
        .enumerate()
        .map(|(idx, e)| {
            let index_str = format!("{:>2}.", idx + 1);
            let name = match width {
                Some(w) => truncate(&e.name, w),
                None => e.name.clone(),
            };
            let average = format!("{:>5}", format_score(e.average_opportunity()));
            let change = format!("{:>+5.1}", e.change());
            let current = format!("{:>5}", format_score(e.current_opportunity()));

            if use_colors {
                let change = if e.change() > 0.0 {
                    change.red().to_string()
                } else if e.change() < 0.0 {
                    change.green().to_string()
                } else {
                    change.dimmed().to_string()
                };
                format!(
                    "{}  {}  {}  {}  {}  {}",
                    index_str.dimmed(),
                    average.bold(),
                    change,
                    current,
                    format_level(e.level(), true),
                    name
                )
            } else {
                format!(
                    "{}  {}  {}  {}  {}  {}",
                    index_str,
                    average,
                    change,
                    current,
                    format_level(e.level(), false),
                    name
                )
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

const SPARK_BARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Bar glyphs scaled between the series minimum and maximum, then the labelled values
pub fn format_sparkline(points: &[SparkPoint]) -> String {
    if points.is_empty() {
        return "No scores found.".to_string();
    }

    let min = points.iter().map(|p| p.score).fold(f64::INFINITY, f64::min);
    let max = points.iter().map(|p| p.score).fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;

    let bars: String = points
        .iter()
        .map(|p| {
            let slot = if span > 0.0 {
                (((p.score - min) / span) * (SPARK_BARS.len() - 1) as f64).round() as usize
            } else {
                SPARK_BARS.len() / 2
            };
            SPARK_BARS[slot.min(SPARK_BARS.len() - 1)]
        })
        .collect();

    let values = points
        .iter()
        .map(|p| format!("{} {}", p.label, format_score(p.score)))
        .collect::<Vec<_>>()
        .join("  ");

    format!("{}\n{}", bars, values)
}

fn status_marker(status: EntityStatus, use_colors: bool) -> String {
    match status {
        EntityStatus::Active => String::new(),
        EntityStatus::Archived if use_colors => format!(" {}", "[archived]".dimmed()),
        EntityStatus::Archived => " [archived]".to_string(),
    }
}

/// Indented tree: big jobs, little jobs, outcomes (with tags)
pub fn format_hierarchy(hierarchy: &Hierarchy, use_colors: bool) -> String {
    if hierarchy.big_jobs.is_empty() {
        return "No big jobs found.".to_string();
    }

    let mut lines = Vec::new();
    for bj in &hierarchy.big_jobs {
        let title = if use_colors {
            format!("{} ({})", bj.name.bold(), bj.id.cyan())
        } else {
            format!("{} ({})", bj.name, bj.id)
        };
        lines.push(format!("{}{}", title, status_marker(bj.status, use_colors)));

        for lj in &bj.little_jobs {
            let title = if use_colors {
                format!("{} ({})", lj.name, lj.id.cyan())
            } else {
                format!("{} ({})", lj.name, lj.id)
            };
            lines.push(format!("  {}{}", title, status_marker(lj.status, use_colors)));

            for o in &lj.outcomes {
                let tags = if o.tags.is_empty() {
                    String::new()
                } else {
                    let joined = o.tags.iter().map(String::as_str).collect::<Vec<_>>().join(", ");
                    format!(" #{}", joined)
                };
                let title = if use_colors {
                    format!("{} ({}){}", o.name, o.id.cyan(), tags.yellow())
                } else {
                    format!("{} ({}){}", o.name, o.id, tags)
                };
                lines.push(format!("    - {}{}", title, status_marker(o.status, use_colors)));
            }
        }
    }
    lines.join("\n")
}

/// Newest first: age, action, entity type, entity id and name
pub fn format_audit_log(log: &AuditLog, use_colors: bool) -> String {
    if log.is_empty() {
        return "No changes recorded.".to_string();
    }

    let now = Utc::now();
    log.entries()
        .map(|entry| {
            let age = format!("{:>4}", format_age(now - entry.timestamp));
            let action = format!("{:<6}", entry.action.as_str());
            let kind = format!("{:<10}", entry.entity_type.to_string());
            if use_colors {
                format!(
                    "{}  {}  {}  {} {}",
                    age.dimmed(),
                    action.bold(),
                    kind,
                    entry.entity_id.cyan(),
                    entry.entity_name
                )
            } else {
                format!(
                    "{}  {}  {}  {} {}",
                    age, action, kind, entry.entity_id, entry.entity_name
                )
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format a duration into a human-readable age string
/// "2h" for hours, "3d" for days, "1w" for weeks
pub fn format_age(duration: Duration) -> String {
    let hours = duration.num_hours();
    let days = duration.num_days();
    let weeks = days / 7;

    if weeks >= 1 {
        format!("{}w", weeks)
    } else if days >= 1 {
        format!("{}d", days)
    } else if hours >= 1 {
        format!("{}h", hours)
    } else {
        let minutes = duration.num_minutes();
        if minutes >= 1 {
            format!("{}m", minutes)
        } else {
            "now".to_string()
        }
    }
}
