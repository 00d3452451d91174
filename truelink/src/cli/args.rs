//! CLI argument definitions.

use clap::{Args, Parser, Subcommand};

use crate::models::Decision;

/// TrueLink - terminal client for the TrueLink professional network
#[derive(Parser, Debug)]
#[command(name = "truelink")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// API origin (overrides TRUELINK_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Credential file (overrides TRUELINK_SESSION_FILE)
    #[arg(long, global = true)]
    pub session_file: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sign in with email and password
    Login {
        #[arg(long)]
        email: String,

        #[arg(long, env = "TRUELINK_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Create an account and sign in
    Register {
        #[arg(long)]
        email: String,

        /// Full name shown to other users
        #[arg(long)]
        name: String,

        #[arg(long, env = "TRUELINK_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Forget the stored credential
    Logout,

    /// Show whether a credential is stored
    Status,

    /// Overview: profile strength, network size, pending requests
    Dashboard,

    /// View or edit your professional profile
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },

    /// Search the directory by name or email
    Search {
        /// Search term
        #[arg(trailing_var_arg = true, required = true)]
        term: Vec<String>,
    },

    /// Send a connection request
    Connect {
        /// ID of the user to connect with
        user_id: String,

        /// Run this search first and show the remaining results afterwards
        #[arg(long)]
        from_search: Option<String>,
    },

    /// List pending connection requests
    Requests,

    /// Accept a pending connection request
    Accept {
        /// Request ID
        id: String,
    },

    /// Reject a pending connection request
    Reject {
        /// Request ID
        id: String,
    },

    /// Accept or reject a pending request
    Respond {
        /// Request ID
        id: String,

        /// accept | reject
        #[arg(value_parser = parse_decision)]
        decision: Decision,
    },

    /// List your connections
    Connections,
}

#[derive(Subcommand, Debug)]
pub enum ProfileAction {
    /// Print your profile
    Show,

    /// Update profile fields; an empty value clears the field
    Edit(ProfileEdit),
}

/// Fields left out keep their current value.
#[derive(Args, Debug, Default)]
pub struct ProfileEdit {
    #[arg(long)]
    pub headline: Option<String>,

    #[arg(long)]
    pub summary: Option<String>,

    #[arg(long)]
    pub location: Option<String>,

    #[arg(long)]
    pub website: Option<String>,

    /// Current job title
    #[arg(long)]
    pub position: Option<String>,

    /// Current employer
    #[arg(long)]
    pub company: Option<String>,
}

fn parse_decision(s: &str) -> Result<Decision, String> {
    Decision::from_str(s).ok_or_else(|| format!("expected accept or reject, got '{s}'"))
}
