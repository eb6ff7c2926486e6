pub mod config;
pub mod content;
pub mod lint;
pub mod logger;
pub mod post_cache;
pub mod post_list;
pub mod queue;
pub mod scaffold;
pub mod text_utils;
pub mod util;
pub mod view;
mod test_data;
