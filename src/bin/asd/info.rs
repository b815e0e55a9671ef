use std::fs::File;
use std::io::{stdout, BufReader, Write};
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use smarttrak::{AsdReader, DecodeEvent, DecoderConfig, Dive, Header};
use tracing::{info, warn};

use crate::Format;

#[derive(Debug, Serialize)]
struct Info {
    filename: String,
    header: Header,
    header_events: Vec<DecodeEvent>,
    dives: Vec<DiveInfo>,
}

#[derive(Debug, Serialize)]
pub(crate) struct DiveInfo {
    pub(crate) dive: Dive,
    pub(crate) events: Vec<DecodeEvent>,
}

fn decode(fpath: &Path, config: DecoderConfig) -> Result<Info> {
    let file = File::open(fpath).context("opening input")?;
    let reader = AsdReader::new(BufReader::new(file), config).context("reading header")?;
    info!("logbook {:?}", reader.header().name);

    let header = reader.header().clone();
    let header_events = reader.header_events().to_vec();
    let mut dives = Vec::default();
    for zult in reader {
        match zult {
            Ok(decoded) => dives.push(DiveInfo {
                dive: decoded.value,
                events: decoded.events,
            }),
            Err(err) => {
                // Keep what was decoded; the stream cannot be resynchronized.
                warn!("stopping after {} dives: {err}", dives.len());
                break;
            }
        }
    }

    Ok(Info {
        filename: fpath.to_string_lossy().to_string(),
        header,
        header_events,
        dives,
    })
}

pub(crate) fn info(
    fpath: &Path,
    format: Format,
    config: DecoderConfig,
    profile: bool,
) -> Result<()> {
    let info = decode(fpath, config)?;

    match format {
        Format::Json => {
            serde_json::to_writer_pretty(stdout(), &info).context("serializing to json")
        }
        Format::Text => {
            let mut out = stdout().lock();
            writeln!(out, "{}", info.filename)?;
            writeln!(out, "Logbook: {}", info.header.name)?;
            write_dives(&mut out, &info.dives, profile)
        }
    }
}

pub(crate) fn write_dives<W: Write>(
    out: &mut W,
    dives: &[DiveInfo],
    profile: bool,
) -> Result<()> {
    let mut hb = handlebars::Handlebars::new();
    hb.register_escape_fn(handlebars::no_escape);
    hb.register_template_string("dive", DIVE_TEMPLATE)
        .map_err(|err| anyhow!("registering template: {err}"))?;

    for DiveInfo { dive, events } in dives {
        let rendered = hb.render("dive", dive).context("rendering text")?;
        out.write_all(rendered.as_bytes()).context("writing to stdout")?;
        writeln!(out, "Events:      {}", events.len())?;
        if profile {
            writeln!(out, "{:<27} {:>8} {:>8}  State", "Time", "Depth", "Temp")?;
            for p in &dive.profile {
                writeln!(
                    out,
                    "{:<27} {:>8.2} {:>8.1}  {}",
                    p.time.to_rfc3339(),
                    p.depth,
                    p.temperature,
                    p.state()
                )?;
            }
        }
    }
    Ok(())
}

const DIVE_TEMPLATE: &str = r"===============================================================================
Dive #{{ sequence }} (device {{ device_id }})
Date:        {{ time }}
Duration:    {{ duration }}s, surface interval {{ surface_interval }}s
Water:       {{ water_type }}
Depths:      max {{ max_depth }}, average {{ average_depth }}, limit {{ depth_limit }}
Temperature: min {{ min_temperature }}, max {{ max_temperature }}, air {{ air_temperature }}, deco {{ deco_temperature }}
Pressure:    start {{ pressure_start }}, end {{ pressure_end }}
Mixture:     {{ percent_o2 }}% O2, {{ percent_he }}% He
Samples:     {{ profile.length }}
";
