use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tunables for the elbow router.
///
/// The defaults reproduce the stock editor behaviour; every distance is in
/// scene units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RoutingConfig {
    /// Outward growth of each routing region on the sides facing away from the
    /// other endpoint.
    pub base_padding: f64,
    /// Distance between a bound shape's outline and the arrow endpoint.
    pub binding_gap: f64,
    /// Stub length in front of a bound endpoint, in multiples of the gap.
    pub stub_gap_multiplier: f64,
    /// Same, when that end carries an arrowhead.
    pub arrowhead_stub_gap_multiplier: f64,
    /// Half-size of the box standing in for a free endpoint.
    pub endpoint_padding: f64,
    /// Fraction of a side's length around its middle that snaps to the midpoint.
    pub snap_tolerance: f64,
    pub snap_min: f64,
    pub snap_max: f64,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            base_padding: 40.0,
            binding_gap: 5.0,
            stub_gap_multiplier: 2.0,
            arrowhead_stub_gap_multiplier: 6.0,
            endpoint_padding: 2.0,
            snap_tolerance: 0.05,
            snap_min: 5.0,
            snap_max: 80.0,
        }
    }
}

impl RoutingConfig {
    /// Stub length in front of a bound endpoint.
    pub fn stub_length(&self, gap: f64, has_arrowhead: bool) -> f64 {
        if has_arrowhead {
            gap * self.arrowhead_stub_gap_multiplier
        } else {
            gap * self.stub_gap_multiplier
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub routing: RoutingConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { pretty: true }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RoutingConfigFile {
    base_padding: Option<f64>,
    binding_gap: Option<f64>,
    stub_gap_multiplier: Option<f64>,
    arrowhead_stub_gap_multiplier: Option<f64>,
    endpoint_padding: Option<f64>,
    snap_tolerance: Option<f64>,
    snap_min: Option<f64>,
    snap_max: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OutputConfigFile {
    pretty: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    routing: Option<RoutingConfigFile>,
    output: Option<OutputConfigFile>,
}

/// Loads a JSON5 config file on top of the defaults. `None` yields the defaults.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let config = Config::default();
    let Some(path) = path else {
        return Ok(config);
    };

    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents, config)
}

fn parse_config(contents: &str, mut config: Config) -> anyhow::Result<Config> {
    let parsed: ConfigFile = json5::from_str(contents)?;

    if let Some(routing) = parsed.routing {
        if let Some(v) = routing.base_padding {
            config.routing.base_padding = v;
        }
        if let Some(v) = routing.binding_gap {
            config.routing.binding_gap = v;
        }
        if let Some(v) = routing.stub_gap_multiplier {
            config.routing.stub_gap_multiplier = v;
        }
        if let Some(v) = routing.arrowhead_stub_gap_multiplier {
            config.routing.arrowhead_stub_gap_multiplier = v;
        }
        if let Some(v) = routing.endpoint_padding {
            config.routing.endpoint_padding = v;
        }
        if let Some(v) = routing.snap_tolerance {
            config.routing.snap_tolerance = v;
        }
        if let Some(v) = routing.snap_min {
            config.routing.snap_min = v;
        }
        if let Some(v) = routing.snap_max {
            config.routing.snap_max = v;
        }
    }

    if let Some(output) = parsed.output
        && let Some(v) = output.pretty
    {
        config.output.pretty = v;
    }

    if config.routing.snap_min > config.routing.snap_max {
        anyhow::bail!(
            "snapMin ({}) must not exceed snapMax ({})",
            config.routing.snap_min,
            config.routing.snap_max
        );
    }

    Ok(config)
}
