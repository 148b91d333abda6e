use std::{
    fs::File,
    io::{stdin, stdout, Write},
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, Result};
use rayon::prelude::*;
use rds::{
    blocks::{read_groups, read_groups_with_lookup, ErrorLookup},
    group::{Group, GroupBlock, GROUP_LEN},
    Options,
};
use serde::Serialize;
use tracing::{debug, info};

#[derive(Debug, Clone, clap::ValueEnum)]
pub enum Format {
    /// Four hex words per line, "----" for missing blocks.
    Text,
    /// One JSON object per line.
    Json,
}

#[derive(Serialize)]
struct GroupRecord<'a> {
    pi: Option<u16>,
    complete: bool,
    c_prime: bool,
    errors: usize,
    blocks: &'a [Option<GroupBlock>; GROUP_LEN],
}

impl<'a> From<&'a Group> for GroupRecord<'a> {
    fn from(group: &'a Group) -> Self {
        GroupRecord {
            pi: group.pi(),
            complete: group.is_complete(),
            c_prime: group.has_c_prime(),
            errors: group.num_errors(),
            blocks: group.blocks(),
        }
    }
}

fn hex_line(group: &Group) -> String {
    group
        .blocks()
        .iter()
        .map(|b| b.map_or_else(|| "----".to_string(), |b| format!("{:04X}", b.data)))
        .collect::<Vec<String>>()
        .join(" ")
}

fn write_group<W: Write>(dst: &mut W, group: &Group, format: &Format) -> Result<()> {
    match format {
        Format::Text => writeln!(dst, "{}", hex_line(group))?,
        Format::Json => {
            serde_json::to_writer(&mut *dst, &GroupRecord::from(group))
                .context("serializing group")?;
            writeln!(dst)?;
        }
    }
    Ok(())
}

pub fn decode_stdin(opts: &Options, format: &Format, partial: bool) -> Result<()> {
    let mut dst = stdout().lock();

    for group in read_groups(stdin().lock(), opts.clone()) {
        let group = group.context("reading stdin")?;
        if partial || group.is_complete() {
            write_group(&mut dst, &group, format)?;
        }
    }
    Ok(())
}

fn decode_file(path: &Path, opts: &Options, lookup: Arc<ErrorLookup>) -> Result<Vec<Group>> {
    let file = File::open(path).with_context(|| format!("opening {path:?}"))?;
    let mut groups = read_groups_with_lookup(file, opts.clone(), lookup);
    let decoded = groups
        .by_ref()
        .collect::<rds::Result<Vec<Group>>>()
        .with_context(|| format!("reading {path:?}"))?;

    let stats = groups.stream().stats();
    debug!(
        ?path,
        groups = decoded.len(),
        sync_lost = stats.sync_lost,
        uncorrectable = stats.uncorrectable,
        "decoded"
    );
    Ok(decoded)
}

/// Decode `inputs` in parallel, each with its own stream sharing one correction table.
pub fn decode_files(
    inputs: &[PathBuf],
    opts: &Options,
    format: &Format,
    partial: bool,
) -> Result<()> {
    let lookup = Arc::new(ErrorLookup::new());
    info!("decoding {} input(s)", inputs.len());

    let decoded: Vec<Result<Vec<Group>>> = inputs
        .par_iter()
        .map(|path| decode_file(path, opts, lookup.clone()))
        .collect();

    let mut dst = stdout().lock();
    for groups in decoded {
        for group in groups? {
            if partial || group.is_complete() {
                write_group(&mut dst, &group, format)?;
            }
        }
    }
    Ok(())
}
