pub mod formatter;

pub use formatter::{
    format_allocation_table, format_attempt_report, format_exceeds_hint, format_utilization,
    format_validation_errors, kind_code, should_use_colors,
};
