// Copyright 2026 Muvon Un Limited
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "helpdesk")]
#[command(version, author = "Muvon Un Limited <opensource@muvon.io>")]
#[command(about = "Help-center search and live content listings over JSON exports", long_about = None)]
pub struct Cli {
    /// Verbose logging for this crate
    #[arg(long, global = true)]
    pub debug: bool,

    /// Also write JSON logs to the storage directory
    #[arg(long, global = true)]
    pub log_file: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search articles, videos and FAQs by keyword
    Search {
        /// Search terms
        #[arg(required = true)]
        query: Vec<String>,

        /// Directory holding articles.json, videos.json and faqs.json
        #[arg(short, long)]
        data: PathBuf,

        /// Maximum number of results (defaults to search.default_limit)
        #[arg(short, long)]
        limit: Option<usize>,

        /// Restrict to content types (comma-separated: article,video,faq)
        #[arg(short = 't', long = "type")]
        types: Option<String>,

        /// Restrict to one category
        #[arg(short, long)]
        category: Option<String>,

        /// Include drafts in the result set
        #[arg(long)]
        include_drafts: bool,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Print a collection and every change to it until interrupted
    Watch {
        /// Collection to watch: articles, videos or faqs
        collection: String,

        /// Directory holding the collection files
        #[arg(short, long)]
        data: PathBuf,

        /// Only records with this status (published or draft)
        #[arg(short, long)]
        status: Option<String>,

        /// Only records in this category
        #[arg(short, long)]
        category: Option<String>,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Print the effective configuration as TOML
    Config,
}
