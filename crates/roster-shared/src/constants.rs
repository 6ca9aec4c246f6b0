/// Application name
pub const APP_NAME: &str = "Roster";

/// Prefix marking a direct-message peer identifier
pub const DM_SIGIL: char = '~';

/// Prefix of association paths
pub const SHIP_PREFIX: &str = "/ship/";

/// Prefix of unread-index paths
pub const GRAPH_PREFIX: &str = "/graph/";

/// Settings key holding the serialized group order
pub const GROUP_ORDER_KEY: &str = "groupSorter.order";

/// Title of the home section
pub const HOME_TITLE: &str = "My Channels";

/// Title of the direct-messages section
pub const MESSAGES_TITLE: &str = "Messages";
