//! CLI argument parsing.
use crate::document::{RootElement, DC_NAMESPACE};
use crate::source::{ColumnMatch, Strictness};
use crate::transform::TransformOptions;
use clap::Parser;
use std::path::PathBuf;

pub const DEFAULT_FILE_COLUMN: &str = "filename";
pub const DEFAULT_ROOT_ELEMENT: &str = "dc";
pub const DEFAULT_ROOT_PREFIX: &str = "dc";

#[derive(Parser, Debug)]
#[command(
    name = "csv2metadata",
    version,
    about = "Create a Dublin Core metadata document for each row of a CSV file",
    after_help = concat!(
        "Only columns whose header starts with dc: or dcterms: are copied.\n\n",
        "Rows with a fileref or assetid column are also attached to the matching\n",
        "Preservica entity when credentials are available (--credentials, the\n",
        "CSV2METADATA_CREDENTIALS variable, or preservica.properties in the config\n",
        "directory).\n\n",
        "Examples:\n",
        "  csv2metadata -i records.csv -o out\n",
        "  csv2metadata -i records.csv -o out -c \"file name\" -r record -p oai \\\n",
        "    -n http://www.openarchives.org/OAI/2.0/",
    )
)]
pub struct Cli {
    /// Input CSV file to parse
    #[arg(short, long, value_name = "FILE")]
    pub input: PathBuf,

    /// Folder which will contain the XML documents
    #[arg(short, long, value_name = "DIR")]
    pub output: PathBuf,

    /// Column holding the output file name of each row
    #[arg(short, long, value_name = "NAME", default_value = DEFAULT_FILE_COLUMN)]
    pub column: String,

    /// Local name of the root element
    #[arg(short, long, value_name = "NAME", default_value = DEFAULT_ROOT_ELEMENT)]
    pub root: String,

    /// Namespace prefix of the root element
    #[arg(short, long, value_name = "PREFIX", default_value = DEFAULT_ROOT_PREFIX)]
    pub prefix: String,

    /// Namespace of the root element, also the schema attached remotely
    #[arg(short, long, value_name = "URI", default_value = DC_NAMESPACE)]
    pub namespace: String,

    /// Accept a byte-order mark, padded headers, and ragged rows
    #[arg(long)]
    pub permissive: bool,

    /// Match the file name column by substring (first matching header wins)
    #[arg(long)]
    pub substring_column: bool,

    /// Properties file with preservica.domain, preservica.username, preservica.password
    #[arg(long, value_name = "FILE", conflicts_with = "no_upload")]
    pub credentials: Option<PathBuf>,

    /// Only write documents; never contact the repository
    #[arg(long)]
    pub no_upload: bool,

    /// Emit the run summary as JSON
    #[arg(long)]
    pub json: bool,

    /// Emit debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn transform_options(&self) -> TransformOptions {
        TransformOptions {
            output_dir: self.output.clone(),
            column: self.column.clone(),
            column_match: if self.substring_column {
                ColumnMatch::Substring
            } else {
                ColumnMatch::Exact
            },
            strictness: if self.permissive {
                Strictness::Permissive
            } else {
                Strictness::Strict
            },
            root: RootElement {
                name: self.root.clone(),
                prefix: self.prefix.clone(),
                namespace: self.namespace.clone(),
            },
        }
    }
}
