use std::sync::Arc;

use anyhow::Result;
use tracing::{info, Level};

use mdforge_markdown::{MarkdownEngine, MokaRenderCache};

const DOC: &str = "---
title: Release notes
---
# Release notes

## Fixed
- Tables keep their **alignment**
    - `:-:` centers a column
- Escaped \\*stars\\* stay literal

## Fixed

| Area | Status |
|:-----|-------:|
| lists | done |

See https://example.com for details.
";

fn main() -> Result<()> {
    // 1. Setup Logging
    tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_writer(std::io::stderr)
        .init();
    info!("Starting cached render demo");

    // 2. Engine with an in-process cache
    let engine = MarkdownEngine::new().with_cache(Arc::new(MokaRenderCache::new()));

    // 3. Lint, then render twice; the second render is a cache hit
    for warning in engine.validate(DOC) {
        info!(%warning, "Lint");
    }
    let first = engine.render(DOC);
    let second = engine.render(DOC);
    assert_eq!(first, second);

    // 4. Drop everything and render again
    engine.clear_cache(None);
    println!("{}", engine.render(DOC));

    Ok(())
}
