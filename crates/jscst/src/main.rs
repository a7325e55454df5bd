mod check;

use anyhow::{Context, bail};
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, ValueEnum};
use jscst_ast::{AstNode, Grammar, Tree as _};
use jscst_cst::{CstError, CstNode, Schema, StrategyKind, build, project};
use jscst_errors::{Diagnostic, Renderer};
use jscst_inputs::File;
use jscst_parse::Parse;
use jscst_syntax::TokenRole;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "jscst", about = "Concrete syntax trees for JavaScript")]
enum Options {
    /// Lists the tokens of a file with their role and position.
    Tokens { path: Utf8PathBuf },
    /// Prints the ESTree AST as JSON.
    Ast { path: Utf8PathBuf },
    /// Prints the CST with its extras.
    Cst {
        path: Utf8PathBuf,
        #[arg(long, value_enum, default_value_t)]
        strategy: StrategyFlag,
    },
    /// Builds the CST and prints its projection back to the AST.
    Project {
        path: Utf8PathBuf,
        #[arg(long, value_enum, default_value_t)]
        strategy: StrategyFlag,
    },
    /// Checks that the CST keeps both the source text and the AST.
    Check {
        path: Utf8PathBuf,
        /// Checks only this strategy. Without it every strategy is checked
        /// and their reconstructed texts are compared.
        #[arg(long, value_enum)]
        strategy: Option<StrategyFlag>,
    },
    /// Prints the label table of a strategy as JSON.
    Schema {
        #[arg(long, value_enum, default_value_t)]
        strategy: StrategyFlag,
        /// A grammar table to use instead of the bundled one.
        #[arg(long)]
        grammar: Option<Utf8PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
enum StrategyFlag {
    /// `before`/`inside`/`after` everywhere, plus virtual nodes.
    #[default]
    Virtual,
    /// Per-type labels, no virtual nodes.
    Labels,
}

impl From<StrategyFlag> for StrategyKind {
    fn from(flag: StrategyFlag) -> Self {
        match flag {
            StrategyFlag::Virtual => Self::VirtualNodes,
            StrategyFlag::Labels => Self::ExtendedLabels,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    match Options::parse() {
        Options::Tokens { path } => {
            let file = read(&path)?;
            let parse = parse(&file)?;

            for source in &parse.tokens {
                let token = &source.token;
                let role = match source.role {
                    TokenRole::Semantic => "semantic",
                    TokenRole::Extra => "extra",
                };
                let (start, end) = (token.span.start, token.span.end);
                println!(
                    "{role:<8} {:<16} {:?} {}:{}-{}:{} {:?}",
                    format!("{:?}", token.kind),
                    token.range(),
                    start.line + 1,
                    start.col + 1,
                    end.line + 1,
                    end.col + 1,
                    token.text(),
                );
            }
        }
        Options::Ast { path } => {
            let file = read(&path)?;
            let parse = parse(&file)?;
            print_json(&path, &parse.ast)?;
        }
        Options::Cst { path, strategy } => {
            let file = read(&path)?;
            let schema = Schema::es5(strategy.into())?;
            let parse = parse(&file)?;
            print!("{}", cst(&schema, &file, &parse)?);
        }
        Options::Project { path, strategy } => {
            let file = read(&path)?;
            let schema = Schema::es5(strategy.into())?;
            let parse = parse(&file)?;
            let cst = cst(&schema, &file, &parse)?;
            let ast = project(&cst).with_context(|| format!("failed to project `{path}`"))?;
            print_json(&path, &ast)?;
        }
        Options::Check { path, strategy } => {
            let file = read(&path)?;
            let kinds = match strategy {
                Some(flag) => vec![flag.into()],
                None => StrategyKind::ALL.to_vec(),
            };
            let schemas = kinds.into_iter().map(Schema::es5).collect::<Result<Vec<_>, _>>()?;
            let parse = parse(&file)?;

            let failures = check::run(&schemas, &file, &parse);
            if failures > 0 {
                bail!("{failures} check(s) failed for `{path}`");
            }
        }
        Options::Schema { strategy, grammar } => {
            let grammar = match grammar {
                Some(path) => {
                    let text = std::fs::read_to_string(&path)
                        .with_context(|| format!("failed to read `{path}`"))?;
                    Grammar::from_json(&text)
                        .with_context(|| format!("invalid grammar table `{path}`"))?
                }
                None => Grammar::es5(),
            };
            let schema = Schema::new(grammar, StrategyKind::from(strategy).strategy())?;
            println!("{}", serde_json::to_string_pretty(&schema.label_table())?);
        }
    }

    Ok(())
}

/// Serializing recurses once per level of the tree.
const MAX_JSON_DEPTH: usize = 1024;

fn print_json(path: &Utf8Path, ast: &AstNode) -> anyhow::Result<()> {
    let depth = ast.depth();
    if depth > MAX_JSON_DEPTH {
        bail!("`{path}` nests {depth} levels deep, JSON output stops at {MAX_JSON_DEPTH}");
    }
    println!("{}", serde_json::to_string_pretty(ast)?);
    Ok(())
}

fn read(path: &Utf8Path) -> anyhow::Result<File> {
    let text =
        std::fs::read_to_string(path).with_context(|| format!("failed to read `{path}`"))?;
    Ok(File::new(path, text))
}

fn parse(file: &File) -> anyhow::Result<Parse> {
    match jscst_parse::parse_file(file) {
        Ok(parse) => Ok(parse),
        Err(error) => {
            report(file, &Diagnostic::from(&error));
            bail!("failed to parse `{}`", file.path())
        }
    }
}

fn cst(schema: &Schema, file: &File, parse: &Parse) -> anyhow::Result<CstNode> {
    build(schema, &parse.ast, &parse.tokens)
        .inspect_err(|error| explain(file, error))
        .with_context(|| format!("failed to build the CST of `{}`", file.path()))
}

/// Renders `error` against the source when it points into it.
fn explain(file: &File, error: &CstError) {
    if let Some(diagnostic) = error.diagnostic() {
        report(file, &diagnostic);
    }
}

fn report(file: &File, diagnostic: &Diagnostic) {
    let renderer = Renderer::styled();
    eprintln!("{}", diagnostic.render(&renderer, file.path().as_str(), file.text()));
}
