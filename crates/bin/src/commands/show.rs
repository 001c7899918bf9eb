//! Show command - prints a committed node.

use super::{open_store, parse_path};
use crate::{
    cli::{Cli, ShowArgs},
    output::print_node,
};

/// Run the show command
pub fn run(cli: &Cli, args: &ShowArgs) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(cli)?;
    let path = parse_path(&args.path)?;
    let (root, revision) = store.head_with_revision();

    let node = root
        .node_at(&path)
        .ok_or_else(|| format!("No node at {path}"))?;
    print_node(path.as_str(), node, revision, cli.format)
}
