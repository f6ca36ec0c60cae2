pub mod formatter;

pub use formatter::{
    format_age, format_audit_log, format_evolution_table, format_hierarchy, format_job_summaries,
    format_level, format_round_table, format_rounds, format_score, format_score_result,
    format_sparkline, should_use_colors,
};
