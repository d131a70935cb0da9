// UI and formatting module

pub mod formatters;
pub mod monitor_formatters;

// Re-export commonly used items for cleaner imports
pub use formatters::{create_usage_bar, format_rate, format_size, format_time};
pub use monitor_formatters::{print_alert_page, print_connections, print_snapshot, print_topology};
