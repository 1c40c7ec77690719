use cspforge::{config::Config, filters, name, HashAlgorithm, RequestPolicy, SharedPolicy};
use std::net::SocketAddr;
use tokio::runtime;
use warp::Filter;

const INLINE_STYLE: &str = "body { font-family: sans-serif; }";

fn index(hash_algorithm: HashAlgorithm, mut csp: RequestPolicy) -> impl warp::Reply {
    // style is only known at render time, allow it by hash
    csp.hash(name::STYLE_SRC, hash_algorithm, INLINE_STYLE);

    let script = match csp.nonce() {
        Some(nonce) => format!(
            r#"<script nonce="{}">document.body.dataset.csp = "nonce";</script>"#,
            nonce
        ),
        None => String::new(),
    };
    let body = format!(
        "<!doctype html><html><head><style>{}</style></head><body><p>{}</p>{}</body></html>",
        INLINE_STYLE,
        csp.header_name(),
        script
    );

    filters::reply(warp::reply::html(body), csp)
}

async fn run() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let config = Config::from_env()?;
    let shared = SharedPolicy::new(config.policy()?).report_only(config.report_only);
    if let Some(header) = shared.load().compiled() {
        tracing::info!(%header, header_name = shared.header_name(), "serving policy");
    }

    let hash_algorithm = config.hash_algorithm;
    let root = warp::get()
        .and(warp::path::end())
        .and(filters::csp(shared.clone()))
        .map(move |csp: RequestPolicy| index(hash_algorithm, csp));
    let routes = root.recover(filters::handle_rejection);

    let addr = SocketAddr::new(config.ip_addr, config.port);
    tracing::info!(%addr, "listening");
    warp::serve(routes).run(addr).await;

    Ok(())
}

fn main() {
    let rt = match runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Can't start runtime: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = rt.block_on(run()) {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
