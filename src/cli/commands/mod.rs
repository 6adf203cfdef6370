mod catalog;
mod flags;
mod lists;
mod overrides;
mod play;
mod show;
mod similar;

pub use catalog::cmd_catalog;
pub use flags::{cmd_episode_flag, cmd_flag, cmd_status};
pub use lists::{cmd_continue, cmd_list};
pub use overrides::{cmd_override_list, cmd_override_remove, cmd_override_set};
pub use play::{cmd_play, cmd_sources};
pub use show::cmd_show;
pub use similar::cmd_similar;
