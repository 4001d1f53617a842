use anyhow::Result;
use std::path::Path;

use sentinela_auth::permissions::RUN_CLASSIFICATION;
use sentinela_core::risk::Stage;
use sentinela_core::types::prinad::{Classification, ClassifyRequest, normalize_cpf};

use super::{Context, Credentials};

/// Feature contributions shown with --explain.
const TOP_DRIVERS: usize = 5;

pub async fn run(base_dir: &Path, creds: &Credentials, cpf: &str, explain: bool) -> Result<()> {
    // reject a malformed CPF before prompting for a login
    let cpf = normalize_cpf(cpf)?;
    let ctx = Context::login(base_dir, creds).await?;
    let outcome = classify(&ctx, &cpf, explain).await;
    ctx.finish(outcome).await
}

async fn classify(ctx: &Context, cpf: &str, explain: bool) -> Result<()> {
    ctx.require_writable(RUN_CLASSIFICATION)?;
    let prinad = ctx.backends()?.prinad;
    let req = ClassifyRequest::new(cpf);

    if explain {
        let result = prinad.explained_classify(&req).await?;
        print_classification(&result.classificacao);
        println!();
        println!("Top drivers:");
        for d in result.top_drivers(TOP_DRIVERS) {
            println!("  {:<28} {:+.4}  (value: {})", d.feature, d.contribuicao, d.valor);
        }
    } else {
        let result = prinad.simple_classify(&req).await?;
        print_classification(&result);
    }
    Ok(())
}

fn print_classification(c: &Classification) {
    println!("CPF:          {}", c.cpf);
    println!("PRINAD:       {:.2}", c.prinad);
    match &c.rating_descricao {
        Some(desc) => println!("Rating:       {} ({desc})", c.rating),
        None => println!("Rating:       {}", c.rating),
    }
    println!("PD 12m:       {:.4}", c.pd_12m);
    println!("PD lifetime:  {:.4}", c.pd_lifetime);
    match Stage::try_from(c.estagio_pe) {
        Ok(stage) => println!("Stage:        {stage} ({} ECL)", stage.horizon()),
        Err(_) => println!("Stage:        {} (unrecognised)", c.estagio_pe),
    }
}
