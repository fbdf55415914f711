//! CLI module for oplog
//!
//! Provides the command-line interface for the audit log server.

pub mod serve;

use clap::{Parser, Subcommand};

/// oplog - Operation audit logging for controller handlers
#[derive(Parser, Debug)]
#[command(name = "oplog")]
#[command(version, about, long_about = None)]
#[command(after_help = r#"ENVIRONMENT VARIABLES:
    OPLOG_HOST                  Bind address (default: 0.0.0.0)
    OPLOG_PORT                  Listen port (default: 8080)
    OPLOG_DATABASE_URL          Database URL (default: sqlite://oplog.db)
    OPLOG_CONTROLLER_NAMESPACE  Audited controller namespace (default: oplog.controller)
    OPLOG_FAILURE_MODE          propagate | suppress (default: propagate)
    OPLOG_DEFAULT_ACTOR_ID      Actor id when the caller is unknown (default: 0)
    OPLOG_DEFAULT_ACTOR_NAME    Actor name when the caller is unknown (default: anonymous)
    OPLOG_DEFAULT_ORIGIN        Origin IP when the client address is unknown (default: 127.0.0.1)
    OPLOG_PARAM_SEPARATOR       Separator appended after each recorded argument (default: ;)
    OPLOG_TRUST_ACTOR_HEADERS   Take the actor from x-actor-id/x-actor-name (default: false)
    RUST_LOG                    Log filter (default: oplog=info,tower_http=info)
"#)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the audit log server
    Serve(serve::ServeArgs),
}
