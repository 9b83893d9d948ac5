//! Adjustment report model and its text, JSON and CSV renderings

use crate::algorithms::adjuster::AdjustmentResult;
use crate::algorithms::geometry::normalize_azimuth;
use crate::core::constants::rad_to_arcsec;
use crate::core::network::Network;
use crate::core::observation::ObservationKind;
use crate::core::types::PointRole;
use serde::{Deserialize, Serialize};

/// Observed baseline as reported (degrees and arc-seconds)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaselineRow {
    pub from: String,
    pub to: String,
    /// Slant distance, or horizontal distance for 2-D baselines
    pub distance_m: f64,
    pub distance_sigma_m: f64,
    /// Azimuth in [0, 360)
    pub azimuth_deg: f64,
    pub azimuth_sigma_arcsec: f64,
    pub zenith_deg: Option<f64>,
    pub zenith_sigma_arcsec: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoordinateRow {
    pub name: String,
    pub role: PointRole,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrecisionRow {
    pub name: String,
    #[serde(rename = "M")]
    pub m_position: f64,
    pub m_x: f64,
    pub m_y: f64,
    pub m_z: Option<f64>,
    pub theta_deg: f64,
    pub a: f64,
    pub b: f64,
}

/// Residual in metres for distances, arc-seconds for angles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResidualRow {
    pub from: String,
    pub to: String,
    pub kind: ObservationKind,
    pub value: f64,
}

/// Tabular summary of one adjustment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjustmentReport {
    pub baselines: Vec<BaselineRow>,
    pub coordinates: Vec<CoordinateRow>,
    pub precision: Vec<PrecisionRow>,
    pub residuals: Vec<ResidualRow>,
    pub reference_variance: f64,
    pub redundancy: usize,
    pub iterations: usize,
}

impl AdjustmentReport {
    pub fn new(network: &Network, result: &AdjustmentResult) -> Self {
        let baselines = network
            .observations()
            .iter()
            .map(|obs| BaselineRow {
                from: obs.from.clone(),
                to: obs.to.clone(),
                distance_m: obs.distance.value,
                distance_sigma_m: obs.distance.std_error,
                azimuth_deg: normalize_azimuth(obs.azimuth.value).to_degrees(),
                azimuth_sigma_arcsec: rad_to_arcsec(obs.azimuth.std_error),
                zenith_deg: obs.zenith.map(|z| z.value.to_degrees()),
                zenith_sigma_arcsec: obs.zenith.map(|z| rad_to_arcsec(z.std_error)),
            })
            .collect();

        let coordinates = result
            .coordinates
            .iter()
            .map(|p| CoordinateRow {
                name: p.name.clone(),
                role: p.role,
                x: p.x,
                y: p.y,
                z: p.z,
            })
            .collect();

        let precision = result
            .precision
            .iter()
            .map(|p| PrecisionRow {
                name: p.point.clone(),
                m_position: p.m_position,
                m_x: p.m_x,
                m_y: p.m_y,
                m_z: p.m_z,
                theta_deg: p.ellipse.theta_deg,
                a: p.ellipse.a,
                b: p.ellipse.b,
            })
            .collect();

        let residuals = result
            .residuals
            .iter()
            .filter_map(|r| {
                let obs = network.observations().get(r.row.observation)?;
                let value = if r.row.kind.is_angular() {
                    rad_to_arcsec(r.value)
                } else {
                    r.value
                };
                Some(ResidualRow {
                    from: obs.from.clone(),
                    to: obs.to.clone(),
                    kind: r.row.kind,
                    value,
                })
            })
            .collect();

        Self {
            baselines,
            coordinates,
            precision,
            residuals,
            reference_variance: result.reference_variance,
            redundancy: result.redundancy,
            iterations: result.iterations,
        }
    }

    fn precision_of(&self, name: &str) -> Option<&PrecisionRow> {
        self.precision.iter().find(|p| p.name == name)
    }
}

/// Human-readable text formatter
pub struct TextFormatter {
    /// Decimals for metric values
    pub decimals: usize,
    /// Include the baseline table
    pub include_baselines: bool,
    pub include_residuals: bool,
}

impl Default for TextFormatter {
    fn default() -> Self {
        Self {
            decimals: 4,
            include_baselines: true,
            include_residuals: false,
        }
    }
}

impl TextFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_decimals(mut self, decimals: usize) -> Self {
        self.decimals = decimals;
        self
    }

    pub fn without_baselines(mut self) -> Self {
        self.include_baselines = false;
        self
    }

    pub fn with_residuals(mut self) -> Self {
        self.include_residuals = true;
        self
    }

    pub fn format_text(&self, report: &AdjustmentReport) -> String {
        let d = self.decimals;
        let mut output = String::new();

        if self.include_baselines {
            output.push_str("Baselines:\n");
            output.push_str(&format!(
                "  {:<8} {:<8} {:>14} {:>10} {:>12} {:>8} {:>12} {:>8}\n",
                "From", "To", "Dist [m]", "σ [m]", "Az [°]", "σ [\"]", "Zen [°]", "σ [\"]"
            ));
            for b in &report.baselines {
                let zenith = b
                    .zenith_deg
                    .map(|z| format!("{:.6}", z))
                    .unwrap_or_else(|| "-".to_string());
                let zenith_sigma = b
                    .zenith_sigma_arcsec
                    .map(|s| format!("{:.2}", s))
                    .unwrap_or_else(|| "-".to_string());
                output.push_str(&format!(
                    "  {:<8} {:<8} {:>14.d$} {:>10.d$} {:>12.6} {:>8.2} {:>12} {:>8}\n",
                    b.from, b.to, b.distance_m, b.distance_sigma_m, b.azimuth_deg, b.azimuth_sigma_arcsec, zenith, zenith_sigma
                ));
            }
            output.push('\n');
        }

        output.push_str("Coordinates:\n");
        output.push_str(&format!(
            "  {:<8} {:<6} {:>16} {:>16} {:>12}\n",
            "Point", "Role", "X [m]", "Y [m]", "Z [m]"
        ));
        for c in &report.coordinates {
            output.push_str(&format!(
                "  {:<8} {:<6} {:>16.d$} {:>16.d$} {:>12.d$}\n",
                c.name,
                role_label(c.role),
                c.x,
                c.y,
                c.z
            ));
        }

        output.push_str("\nPrecision:\n");
        output.push_str(&format!(
            "  {:<8} {:>10} {:>10} {:>10} {:>10} {:>9} {:>10} {:>10}\n",
            "Point", "M [m]", "m_x [m]", "m_y [m]", "m_z [m]", "θ [°]", "a [m]", "b [m]"
        ));
        for p in &report.precision {
            let m_z = p
                .m_z
                .map(|m| format!("{:.d$}", m))
                .unwrap_or_else(|| "-".to_string());
            output.push_str(&format!(
                "  {:<8} {:>10.d$} {:>10.d$} {:>10.d$} {:>10} {:>9.3} {:>10.d$} {:>10.d$}\n",
                p.name, p.m_position, p.m_x, p.m_y, m_z, p.theta_deg, p.a, p.b
            ));
        }

        if self.include_residuals {
            output.push_str("\nResiduals:\n");
            for r in &report.residuals {
                let unit = if r.kind.is_angular() { "\"" } else { "m" };
                output.push_str(&format!(
                    "  {:<8} {:<8} {:<20} {:>12.d$} {}\n",
                    r.from,
                    r.to,
                    r.kind.to_string(),
                    r.value,
                    unit
                ));
            }
        }

        output.push_str(&format!(
            "\nReference variance: {:.6}\nRedundancy:         {}\nIterations:         {}\n",
            report.reference_variance, report.redundancy, report.iterations
        ));

        output
    }
}

fn role_label(role: PointRole) -> &'static str {
    match role {
        PointRole::Fixed => "fixed",
        PointRole::Free => "free",
    }
}

/// JSON formatter for structured output
#[derive(Default)]
pub struct JsonFormatter {
    pub pretty: bool,
}

impl JsonFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pretty() -> Self {
        Self { pretty: true }
    }

    pub fn format_json(&self, report: &AdjustmentReport) -> Result<String, serde_json::Error> {
        if self.pretty {
            serde_json::to_string_pretty(report)
        } else {
            serde_json::to_string(report)
        }
    }
}

/// CSV formatter: one row per point, coordinates joined with precision
pub struct CsvFormatter {
    pub include_header: bool,
}

impl Default for CsvFormatter {
    fn default() -> Self {
        Self { include_header: true }
    }
}

impl CsvFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header(&self) -> String {
        "name,role,x,y,z,M,m_x,m_y,m_z,theta_deg,a,b".to_string()
    }

    pub fn format_csv(&self, report: &AdjustmentReport) -> String {
        let mut lines = Vec::with_capacity(report.coordinates.len() + 1);
        if self.include_header {
            lines.push(self.header());
        }

        for c in &report.coordinates {
            let precision = match report.precision_of(&c.name) {
                Some(p) => format!(
                    "{:.6},{:.6},{:.6},{},{:.4},{:.6},{:.6}",
                    p.m_position,
                    p.m_x,
                    p.m_y,
                    p.m_z.map(|m| format!("{:.6}", m)).unwrap_or_default(),
                    p.theta_deg,
                    p.a,
                    p.b
                ),
                None => ",,,,,,".to_string(),
            };
            lines.push(format!(
                "{},{},{:.4},{:.4},{:.4},{}",
                c.name,
                role_label(c.role),
                c.x,
                c.y,
                c.z,
                precision
            ));
        }

        let mut output = lines.join("\n");
        output.push('\n');
        output
    }
}
