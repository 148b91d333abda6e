use std::{
    collections::BTreeMap,
    fs::File,
    io::{stdin, stdout, Read, Write},
    path::PathBuf,
};

use anyhow::{Context, Result};
use handlebars::handlebars_helper;
use rds::{
    blocks::{read_groups, SyncStats},
    Options,
};
use serde::Serialize;

#[derive(Debug, Clone, clap::ValueEnum)]
pub enum Format {
    Json,
    Text,
}

#[derive(Debug, Clone, Serialize)]
struct Info {
    filename: String,
    bits: u64,
    groups: usize,
    complete_groups: usize,
    stats: SyncStats,
    /// Group counts by hex PI code
    pis: BTreeMap<String, usize>,
}

fn summarize<R: Read>(reader: R, filename: String, opts: &Options) -> Result<Info> {
    let mut groups = read_groups(reader, opts.clone());
    let mut pis: BTreeMap<String, usize> = BTreeMap::default();
    let mut num_groups = 0;
    let mut complete_groups = 0;

    for group in groups.by_ref() {
        let group = group.context("reading input")?;
        num_groups += 1;
        if group.is_complete() {
            complete_groups += 1;
        }
        if let Some(pi) = group.pi() {
            *pis.entry(format!("{pi:04X}")).or_default() += 1;
        }
    }

    let stream = groups.stream();
    Ok(Info {
        filename,
        bits: stream.bitcount(),
        groups: num_groups,
        complete_groups,
        stats: *stream.stats(),
        pis,
    })
}

pub fn info(input: Option<&PathBuf>, opts: &Options, format: &Format) -> Result<()> {
    let info = match input {
        Some(path) => {
            let file = File::open(path).with_context(|| format!("opening {path:?}"))?;
            summarize(file, path.to_string_lossy().to_string(), opts)?
        }
        None => summarize(stdin().lock(), "<stdin>".to_string(), opts)?,
    };

    match format {
        Format::Json => {
            serde_json::to_writer_pretty(stdout(), &info).context("serializing to json")
        }
        Format::Text => {
            let data = render_text(&info).context("serializing info")?;
            stdout()
                .write_all(str::as_bytes(&data))
                .context("writing to stdout")
        }
    }
}

fn render_text(info: &Info) -> Result<String> {
    handlebars_helper!(left_pad: |num: u64, v: Json| {
        let v = match v {
            serde_json::Value::String(s) => s.to_owned(),
            serde_json::Value::Null => String::new(),
            _ => v.to_string()
        };
        let width = usize::try_from(num).unwrap_or(0).max(v.len());
        format!("{v:>width$}")
    });
    let mut hb = handlebars::Handlebars::new();
    hb.register_escape_fn(handlebars::no_escape);
    hb.register_helper("lpad", Box::new(left_pad));
    hb.register_template_string("info", TEXT_TEMPLATE)
        .context("parsing template")?;

    hb.render("info", &info).context("rendering text")
}

const TEXT_TEMPLATE: &str = r"{{ filename }}
=================================================
Bits:           {{ bits }}
Groups:         {{ groups }} ({{ complete_groups }} complete)
Blocks:         {{ stats.blocks }}
With errors:    {{ stats.blocks_with_errors }}
Corrected:      {{ stats.corrected }}
Uncorrectable:  {{ stats.uncorrectable }}
Sync acquired:  {{ stats.sync_acquired }}
Sync lost:      {{ stats.sync_lost }}
-------------------------------------------------
  PI     Groups
-------------------------------------------------
{{ #each pis }}{{ lpad 4 @key }}  {{ lpad 9 this }}
{{/each }}
";
