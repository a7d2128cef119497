pub const APP_NAME: &str = "riastore";

/// Name of the version stamp file at store and dataset level.
pub const VERSION_FILE: &str = "ria-layout-version";

/// Store-level directory collecting special remote error logs.
pub const ERROR_LOGS_DIR: &str = "error_logs";

pub const ARCHIVES_DIR: &str = "archives";
pub const ANNEX_DIR: &str = "annex";
pub const OBJECTS_DIR: &str = "objects";

/// Every RIA URL scheme carries this prefix in front of the transport.
pub const RIA_SCHEME_PREFIX: &str = "ria+";

pub const DEFAULT_ARCHIVER: &str = "7z";
pub const DEFAULT_SSH: &str = "ssh";
