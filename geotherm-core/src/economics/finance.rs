//! Project finance metrics over yearly cash flows.  Index 0 of every cash flow is the
//! construction year.

use crate::imports::*;

/// Net present value of `cash_flow` at `rate`, with year 0 undiscounted
pub fn npv(rate: f64, cash_flow: &Array1<f64>) -> f64 {
    cash_flow
        .iter()
        .enumerate()
        .map(|(yr, cf)| cf / (1.0 + rate).powi(yr as i32))
        .sum()
}

/// Present value of `series` whose first entry is operating year 1
pub fn present_value(rate: f64, series: &Array1<f64>) -> f64 {
    series
        .iter()
        .enumerate()
        .map(|(i, v)| v / (1.0 + rate).powi(i as i32 + 1))
        .sum()
}

/// Internal rate of return by bisection, `None` when the cash flow never changes sign or no
/// root lies in (-99 %, 1000 %)
pub fn irr(cash_flow: &Array1<f64>) -> Option<f64> {
    let (mut lo, mut hi) = (-0.99, 10.0);
    let (mut f_lo, f_hi) = (npv(lo, cash_flow), npv(hi, cash_flow));
    if !f_lo.is_finite() || !f_hi.is_finite() || f_lo.signum() == f_hi.signum() {
        return None;
    }
    for _ in 0..200 {
        let mid = 0.5 * (lo + hi);
        let f_mid = npv(mid, cash_flow);
        if f_mid.abs() < 1e-10 || hi - lo < 1e-12 {
            return Some(mid);
        }
        if f_mid.signum() == f_lo.signum() {
            lo = mid;
            f_lo = f_mid;
        } else {
            hi = mid;
        }
    }
    Some(0.5 * (lo + hi))
}

/// Years until the cumulative cash flow turns non-negative, interpolated within the year
pub fn payback_period(cash_flow: &Array1<f64>) -> Option<f64> {
    let cumulative = utils::ndarrcumsum(cash_flow);
    if cumulative.first().map_or(true, |c| *c >= 0.0) {
        return None;
    }
    cumulative
        .iter()
        .zip(cumulative.iter().skip(1))
        .enumerate()
        .find(|(_, (_, next))| **next >= 0.0)
        .map(|(yr, (prev, next))| yr as f64 + -prev / (next - prev))
}

/// Multiple on invested capital: operating cash returned per unit of capital
pub fn moic(capex: f64, cash_flow: &Array1<f64>) -> f64 {
    if capex <= 0.0 {
        return 0.0;
    }
    cash_flow.iter().skip(1).sum::<f64>() / capex
}

/// Value investment ratio: present value of operating cash per unit of capital
pub fn vir(rate: f64, capex: f64, cash_flow: &Array1<f64>) -> f64 {
    if capex <= 0.0 {
        return 0.0;
    }
    (npv(rate, cash_flow) + capex) / capex
}

/// Capital recovery factor
pub fn crf(rate: f64, years: usize) -> f64 {
    if rate.abs() < 1e-12 {
        return 1.0 / years as f64;
    }
    let growth = (1.0 + rate).powi(years as i32);
    rate * growth / (growth - 1.0)
}

/// Summary metrics of one cash flow, reported under several labels by the add-ons
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectMetrics {
    /// MUSD
    pub npv: f64,
    /// fraction
    pub irr: Option<f64>,
    pub moic: f64,
    pub vir: f64,
    /// yr
    pub payback: Option<f64>,
}

impl ProjectMetrics {
    pub fn new(rate: f64, capex: f64, cash_flow: &Array1<f64>) -> Self {
        Self {
            npv: npv(rate, cash_flow),
            irr: irr(cash_flow),
            moic: moic(capex, cash_flow),
            vir: vir(rate, capex, cash_flow),
            payback: payback_period(cash_flow),
        }
    }

    /// Writes the metrics to the outputs named `"<base><suffix>"`, e.g. `"Project NPV with CCUS"`.
    /// Undefined IRR and payback are reported as `N/A`; the VIR is skipped when undeclared.
    pub fn write(&self, outputs: &mut OutputParameterDict, suffix: &str) -> anyhow::Result<()> {
        outputs.set_scalar(&format!("Project NPV{suffix}"), self.npv)?;
        match self.irr {
            Some(irr) => outputs.set_scalar(&format!("Project IRR{suffix}"), irr * 100.0)?,
            None => outputs.set_text(&format!("Project IRR{suffix}"), "N/A")?,
        }
        outputs.set_scalar(&format!("Project MOIC{suffix}"), self.moic)?;
        if outputs.contains(&format!("Project VIR{suffix}")) {
            outputs.set_scalar(&format!("Project VIR{suffix}"), self.vir)?;
        }
        match self.payback {
            Some(years) => outputs.set_scalar(&format!("Project Payback Period{suffix}"), years)?,
            None => outputs.set_text(&format!("Project Payback Period{suffix}"), "N/A")?,
        }
        Ok(())
    }
}
