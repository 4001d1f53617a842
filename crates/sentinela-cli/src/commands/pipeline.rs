use anyhow::{Context as _, Result, bail};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use sentinela_auth::audit::actions;
use sentinela_auth::permissions::{EXPORT_REPORT, RUN_PIPELINE};
use sentinela_core::report::{ReportMeta, format_brl, format_pct, render_portfolio_report};
use sentinela_core::risk::Stage;
use sentinela_core::types::ecl::{
    EclRequest, MAX_PORTFOLIO, PortfolioRequest, PortfolioResult, StageSummary,
};
use sentinela_core::types::prinad::{
    BatchClassifyRequest, Classification, ClassifyRequest, MAX_BATCH, normalize_cpf,
};

use super::{Context, Credentials};

/// One line of the operations file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PipelineOperation {
    pub cpf: String,
    pub produto: String,
    pub saldo_utilizado: f64,
    pub limite_total: f64,
    #[serde(default)]
    pub grupo_homogeneo: Option<String>,
}

/// Parse the operations file, normalising every CPF.
pub fn read_operations(path: &Path) -> Result<Vec<PipelineOperation>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read {}", path.display()))?;
    let mut ops: Vec<PipelineOperation> = serde_json::from_str(&content)
        .with_context(|| format!("{} is not a JSON array of operations", path.display()))?;
    if ops.is_empty() {
        bail!("{} contains no operations", path.display());
    }
    for (i, op) in ops.iter_mut().enumerate() {
        op.cpf = normalize_cpf(&op.cpf).with_context(|| format!("operation {i}"))?;
    }
    Ok(ops)
}

/// ECL requests for every classified operation, plus the CPFs left out.
pub fn to_ecl_requests(
    ops: &[PipelineOperation],
    classified: &HashMap<String, Classification>,
) -> (Vec<EclRequest>, Vec<String>) {
    let mut requests = Vec::with_capacity(ops.len());
    let mut skipped = Vec::new();
    for op in ops {
        let Some(c) = classified.get(&op.cpf) else {
            skipped.push(op.cpf.clone());
            continue;
        };
        requests.push(EclRequest {
            cliente_id: op.cpf.clone(),
            produto: op.produto.clone(),
            saldo_utilizado: op.saldo_utilizado,
            limite_total: op.limite_total,
            prinad: Some(c.prinad),
            estagio: Stage::try_from(c.estagio_pe).ok(),
            grupo_homogeneo: op.grupo_homogeneo.clone(),
        });
    }
    (requests, skipped)
}

/// Combine the results of several portfolio calls into one.
pub fn merge_portfolios(parts: Vec<PortfolioResult>) -> PortfolioResult {
    let mut stages: BTreeMap<Stage, StageSummary> = BTreeMap::new();
    let mut merged = PortfolioResult {
        ecl_total: 0.0,
        ead_total: 0.0,
        por_estagio: Vec::new(),
        resultados: Vec::new(),
    };
    for part in parts {
        merged.ecl_total += part.ecl_total;
        merged.ead_total += part.ead_total;
        for s in part.stage_summaries() {
            let entry = stages.entry(s.estagio).or_insert(StageSummary {
                estagio: s.estagio,
                quantidade: 0,
                ead: 0.0,
                ecl: 0.0,
            });
            entry.quantidade += s.quantidade;
            entry.ead += s.ead;
            entry.ecl += s.ecl;
        }
        merged.resultados.extend(part.resultados);
    }
    merged.por_estagio = stages.into_values().collect();
    merged
}

fn progress_bar(len: usize, prefix: &'static str) -> Result<ProgressBar> {
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{prefix:>10} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("=>-"),
    );
    pb.set_prefix(prefix);
    Ok(pb)
}

fn default_report_path(base_dir: &Path, date: &str) -> PathBuf {
    base_dir.join("reports").join(format!("portfolio-{date}.md"))
}

pub async fn run(
    base_dir: &Path,
    creds: &Credentials,
    operations: &Path,
    output: Option<&Path>,
    title: &str,
) -> Result<()> {
    let ops = read_operations(operations)?;
    println!("Loaded {} operations from {}", ops.len(), operations.display());

    let ctx = Context::login(base_dir, creds).await?;
    let outcome = execute(&ctx, &ops, output, title).await;
    ctx.finish(outcome).await
}

async fn execute(
    ctx: &Context,
    ops: &[PipelineOperation],
    output: Option<&Path>,
    title: &str,
) -> Result<()> {
    ctx.require_writable(RUN_PIPELINE)?;
    ctx.require(EXPORT_REPORT)?;
    let backends = ctx.backends()?;

    // Classification
    let mut cpfs: Vec<&str> = ops.iter().map(|o| o.cpf.as_str()).collect();
    cpfs.sort_unstable();
    cpfs.dedup();

    let pb = progress_bar(cpfs.len(), "classify")?;
    let mut classified = HashMap::new();
    let mut failed = 0usize;
    for chunk in cpfs.chunks(MAX_BATCH) {
        let req = BatchClassifyRequest {
            clientes: chunk.iter().map(|cpf| ClassifyRequest::new(*cpf)).collect(),
        };
        let resp = backends.prinad.multiple_classify(&req).await?;
        for e in &resp.erros {
            tracing::warn!(cpf = %e.cpf, erro = %e.erro, "classification failed");
        }
        failed += resp.erros.len();
        for c in resp.resultados {
            let key = normalize_cpf(&c.cpf).unwrap_or_else(|_| c.cpf.clone());
            classified.insert(key, c);
        }
        pb.inc(chunk.len() as u64);
    }
    pb.finish_with_message(format!("{} classified, {failed} failed", classified.len()));

    // ECL
    let (requests, skipped) = to_ecl_requests(ops, &classified);
    if requests.is_empty() {
        bail!("no operation could be classified");
    }
    let pb = progress_bar(requests.len(), "ecl")?;
    let mut parts = Vec::new();
    for chunk in requests.chunks(MAX_PORTFOLIO) {
        let req = PortfolioRequest {
            operacoes: chunk.to_vec(),
        };
        parts.push(backends.ecl.calcular_portfolio(&req).await?);
        pb.inc(chunk.len() as u64);
    }
    pb.finish_with_message("done");
    let portfolio = merge_portfolios(parts);

    // Report
    let date = chrono::Local::now().format("%Y-%m-%d").to_string();
    let author = ctx
        .session()
        .user()
        .map(|u| format!("{} ({})", u.name, u.matricula))
        .unwrap_or_default();
    let meta = ReportMeta {
        title: title.to_string(),
        reference_date: date.clone(),
        author,
    };
    let body = render_portfolio_report(&meta, &portfolio);
    let path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_report_path(&ctx.base_dir, &date));
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, body)?;

    ctx.record(
        actions::RUN_PIPELINE,
        "portfolio",
        &format!(
            "operacoes={} classificados={} ignorados={}",
            ops.len(),
            requests.len(),
            skipped.len()
        ),
    )
    .await?;
    ctx.record(actions::EXPORT_REPORT, "portfolio", &path.display().to_string())
        .await?;

    println!();
    println!("EAD total:  {}", format_brl(portfolio.ead_total));
    println!("ECL total:  {}", format_brl(portfolio.ecl_total));
    println!("Coverage:   {}", format_pct(portfolio.coverage()));
    for s in portfolio.stage_summaries() {
        println!(
            "  {}: {} operations, ECL {}",
            s.estagio,
            s.quantidade,
            format_brl(s.ecl)
        );
    }
    if !skipped.is_empty() {
        println!("Skipped {} unclassified operation(s)", skipped.len());
    }
    println!("Report written to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sentinela_core::types::ecl::EclResult;
    use std::io::Write;

    fn classification(cpf: &str, prinad: f64, stage: u8) -> Classification {
        Classification {
            cpf: cpf.into(),
            prinad,
            rating: "B1".into(),
            rating_descricao: None,
            pd_12m: 0.02,
            pd_lifetime: 0.08,
            estagio_pe: stage,
        }
    }

    fn op(cpf: &str) -> PipelineOperation {
        PipelineOperation {
            cpf: cpf.into(),
            produto: "cartao".into(),
            saldo_utilizado: 1000.0,
            limite_total: 3000.0,
            grupo_homogeneo: None,
        }
    }

    #[test]
    fn operations_file_is_normalised() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"cpf": "123.456.789-09", "produto": "cartao", "saldo_utilizado": 10, "limite_total": 20}}]"#
        )
        .unwrap();
        let ops = read_operations(file.path()).unwrap();
        assert_eq!(ops[0].cpf, "12345678909");
        assert_eq!(ops[0].grupo_homogeneo, None);
    }

    #[test]
    fn bad_cpf_names_the_operation() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"cpf": "12345678909", "produto": "a", "saldo_utilizado": 1, "limite_total": 1}},
                {{"cpf": "999", "produto": "b", "saldo_utilizado": 1, "limite_total": 1}}]"#
        )
        .unwrap();
        let err = read_operations(file.path()).unwrap_err();
        assert_eq!(err.to_string(), "operation 1");
    }

    #[test]
    fn empty_file_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[]").unwrap();
        assert!(read_operations(file.path()).is_err());
    }

    #[test]
    fn requests_carry_classification() {
        let ops = vec![op("11111111111"), op("22222222222")];
        let mut classified = HashMap::new();
        classified.insert("11111111111".to_string(), classification("11111111111", 37.5, 2));

        let (requests, skipped) = to_ecl_requests(&ops, &classified);
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].cliente_id, "11111111111");
        assert_eq!(requests[0].prinad, Some(37.5));
        assert_eq!(requests[0].estagio, Some(Stage::Two));
        assert_eq!(skipped, vec!["22222222222".to_string()]);
    }

    #[test]
    fn unknown_stage_is_left_to_the_backend() {
        let ops = vec![op("11111111111")];
        let mut classified = HashMap::new();
        classified.insert("11111111111".to_string(), classification("11111111111", 90.0, 7));
        let (requests, _) = to_ecl_requests(&ops, &classified);
        assert_eq!(requests[0].estagio, None);
    }

    #[test]
    fn merge_sums_parts() {
        let result = |id: &str, ead: f64, ecl: f64, estagio: Stage| EclResult {
            cliente_id: Some(id.into()),
            pd: 0.1,
            lgd: 0.5,
            ead,
            ecl,
            estagio,
            horizonte_meses: None,
        };
        let a = PortfolioResult {
            ecl_total: 60.0,
            ead_total: 1200.0,
            por_estagio: Vec::new(),
            resultados: vec![
                result("A", 1000.0, 50.0, Stage::One),
                result("B", 200.0, 10.0, Stage::Two),
            ],
        };
        let b = PortfolioResult {
            ecl_total: 40.0,
            ead_total: 800.0,
            por_estagio: Vec::new(),
            resultados: vec![result("C", 800.0, 40.0, Stage::One)],
        };

        let merged = merge_portfolios(vec![a, b]);
        assert_eq!(merged.ecl_total, 100.0);
        assert_eq!(merged.ead_total, 2000.0);
        assert_eq!(merged.resultados.len(), 3);
        assert_eq!(merged.por_estagio.len(), 2);
        assert_eq!(merged.por_estagio[0].estagio, Stage::One);
        assert_eq!(merged.por_estagio[0].quantidade, 2);
        assert_eq!(merged.por_estagio[0].ecl, 90.0);
    }
}
