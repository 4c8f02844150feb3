// Check-in responses
pub const CHECKIN_SUCCESS: &str = "Commit created";
pub const UNAUTHORIZED: &str = "Unauthorized";
pub const ALREADY_PROCESSING: &str = "Already processing";
pub const ALREADY_CHECKED_IN: &str = "Already committed today";
pub const COMPETITION_MISMATCH: &str = "Competition not found";
pub const NO_COMMITS_TODAY: &str = "No commits found for today";
pub const SOURCE_UNAVAILABLE: &str = "Failed to fetch commits";
pub const INTERNAL_ERROR: &str = "Internal server error";

// Streak sweep
pub const SWEEP_COMPLETED: &str = "Streak check completed";
pub const NO_CURRENT_COMPETITION: &str = "No current competition";

// Admin validation
pub const INVALID_COMPETITION_NAME: &str = "Name must be a string between 3 and 50 characters";
pub const INVALID_REPO: &str = "Repo must be a string between 1 and 100 characters";
pub const INVALID_OWNER: &str = "Owner must be a string between 1 and 100 characters";
pub const INVALID_DATE_ORDER: &str = "Start date must be before end date";
pub const DATES_IN_PAST: &str = "Dates must be in the future";
pub const COMPETITION_OVERLAP: &str = "There is already a competition";
pub const INVALID_EMAIL: &str = "Invalid email format";
pub const WHITELIST_ENTRY_NOT_FOUND: &str = "Whitelist entry not found";
