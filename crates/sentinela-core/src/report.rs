//! Deterministic report rendering.
//!
//! The renderer is a pure function of its inputs: the same data always yields
//! byte-identical Markdown. Anything time-dependent (reference date, author)
//! comes in through [`ReportMeta`].

use std::fmt::Write;

use serde::{Deserialize, Serialize};

use crate::types::analytics::FullReport;
use crate::types::ecl::{EclResult, PortfolioResult};

/// Rows listed in the "largest exposures" table.
pub const TOP_EXPOSURES: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportMeta {
    pub title: String,
    pub reference_date: String,
    pub author: String,
}

/// Format an amount the way the bank's statements do: `R$ 1.234.567,89`.
pub fn format_brl(value: f64) -> String {
    let negative = value < 0.0;
    let cents = (value.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let frac = cents % 100;

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    let sign = if negative { "-" } else { "" };
    format!("{sign}R$ {grouped},{frac:02}")
}

/// Format a ratio as a percentage with a decimal comma: `0.1234` → `12,34%`.
pub fn format_pct(ratio: f64) -> String {
    format!("{:.2}%", ratio * 100.0).replace('.', ",")
}

fn header(out: &mut String, meta: &ReportMeta) {
    let _ = writeln!(out, "# {}", meta.title);
    let _ = writeln!(out);
    let _ = writeln!(out, "- Reference date: {}", meta.reference_date);
    let _ = writeln!(out, "- Prepared by: {}", meta.author);
    let _ = writeln!(out);
}

fn largest_exposures(results: &[EclResult], n: usize) -> Vec<&EclResult> {
    let mut rows: Vec<&EclResult> = results.iter().collect();
    rows.sort_by(|a, b| {
        b.ecl
            .total_cmp(&a.ecl)
            .then_with(|| a.cliente_id.cmp(&b.cliente_id))
    });
    rows.truncate(n);
    rows
}

/// Portfolio ECL report: totals, per-stage breakdown, largest exposures.
pub fn render_portfolio_report(meta: &ReportMeta, portfolio: &PortfolioResult) -> String {
    let mut out = String::new();
    header(&mut out, meta);

    let _ = writeln!(out, "## Summary");
    let _ = writeln!(out);
    let _ = writeln!(out, "| Metric | Value |");
    let _ = writeln!(out, "|---|---|");
    let _ = writeln!(out, "| Operations | {} |", portfolio.resultados.len());
    let _ = writeln!(out, "| Total EAD | {} |", format_brl(portfolio.ead_total));
    let _ = writeln!(out, "| Total ECL | {} |", format_brl(portfolio.ecl_total));
    let _ = writeln!(out, "| Coverage | {} |", format_pct(portfolio.coverage()));
    let _ = writeln!(out);

    let _ = writeln!(out, "## ECL by stage");
    let _ = writeln!(out);
    let _ = writeln!(out, "| Stage | Horizon | Operations | EAD | ECL |");
    let _ = writeln!(out, "|---|---|---|---|---|");
    for s in portfolio.stage_summaries() {
        let _ = writeln!(
            out,
            "| {} | {} | {} | {} | {} |",
            s.estagio.number(),
            s.estagio.horizon(),
            s.quantidade,
            format_brl(s.ead),
            format_brl(s.ecl)
        );
    }
    let _ = writeln!(out);

    let top = largest_exposures(&portfolio.resultados, TOP_EXPOSURES);
    if !top.is_empty() {
        let _ = writeln!(out, "## Largest exposures");
        let _ = writeln!(out);
        let _ = writeln!(out, "| Client | Stage | PD | LGD | EAD | ECL |");
        let _ = writeln!(out, "|---|---|---|---|---|---|");
        for r in top {
            let _ = writeln!(
                out,
                "| {} | {} | {} | {} | {} | {} |",
                r.cliente_id.as_deref().unwrap_or("-"),
                r.estagio.number(),
                format_pct(r.pd),
                format_pct(r.lgd),
                format_brl(r.ead),
                format_brl(r.ecl)
            );
        }
        let _ = writeln!(out);
    }

    out
}

/// Model health report: discrimination metrics, drift, accuracy trend, backtest.
pub fn render_model_health_report(meta: &ReportMeta, report: &FullReport) -> String {
    let mut out = String::new();
    header(&mut out, meta);

    let p = &report.performance;
    let _ = writeln!(out, "## Performance");
    let _ = writeln!(out);
    let _ = writeln!(out, "| Metric | Value |");
    let _ = writeln!(out, "|---|---|");
    let _ = writeln!(out, "| AUC-ROC | {:.4} |", p.auc_roc);
    let _ = writeln!(out, "| Gini | {:.4} |", p.gini);
    let _ = writeln!(out, "| KS | {:.4} |", p.ks);
    let _ = writeln!(out, "| Accuracy | {} |", format_pct(p.accuracy));
    let _ = writeln!(out);

    let d = &report.drift;
    let _ = writeln!(out, "## Drift");
    let _ = writeln!(out);
    let _ = writeln!(out, "Global PSI {:.4} ({}).", d.psi_global, d.band());
    let _ = writeln!(out);
    if !d.features.is_empty() {
        let mut features: Vec<_> = d.features.iter().collect();
        features.sort_by(|a, b| b.psi.total_cmp(&a.psi).then_with(|| a.feature.cmp(&b.feature)));
        let _ = writeln!(out, "| Feature | PSI | Band |");
        let _ = writeln!(out, "|---|---|---|");
        for f in features {
            let _ = writeln!(out, "| {} | {:.4} | {} |", f.feature, f.psi, f.band());
        }
        let _ = writeln!(out);
    }

    let _ = writeln!(out, "## Accuracy trend");
    let _ = writeln!(out);
    for point in &report.tendencia.pontos {
        let _ = writeln!(out, "- {}: {}", point.periodo, format_pct(point.acuracia));
    }
    if let Some(delta) = report.tendencia.delta() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Change over the period: {}.", format_pct(delta));
    }
    let _ = writeln!(out);

    let b = &report.backtest;
    let _ = writeln!(out, "## Backtest ({})", b.periodo);
    let _ = writeln!(out);
    let _ = writeln!(out, "| Rating | Predicted PD | Observed | Deviation | Count |");
    let _ = writeln!(out, "|---|---|---|---|---|");
    for bucket in &b.buckets {
        let _ = writeln!(
            out,
            "| {} | {} | {} | {} | {} |",
            bucket.rating,
            format_pct(bucket.pd_prevista),
            format_pct(bucket.taxa_default_observada),
            format_pct(bucket.deviation()),
            bucket.quantidade
        );
    }
    if let Some(ref verdict) = b.resultado {
        let _ = writeln!(out);
        let _ = writeln!(out, "Result: {verdict}");
    }

    out
}
