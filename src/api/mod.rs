use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Router,
    extract::{Json, Path, Query, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{delete, get},
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tracing::{error, info};

use crate::core::{ScenarioInputs, evaluate_scenario};
use crate::rates::fetch_rate_table;
use crate::store::{ScenarioDraft, ScenarioStore, StoredScenario};

const INDEX_HTML: &str = include_str!("../../web/index.html");
const STYLES_CSS: &str = include_str!("../../web/styles.css");
const APP_JS: &str = include_str!("../../web/app.js");

#[derive(Parser, Debug)]
#[command(
    name = "rentroi",
    about = "Rental property ROI calculator (loan amortization, cash flow, payback horizon)"
)]
struct Cli {
    #[arg(long, default_value_t = 0.0, help = "Gross rent per month")]
    rent_per_month: f64,
    #[arg(
        long,
        default_value_t = 0.0,
        help = "Recurring monthly expenses (maintenance, utilities, management)"
    )]
    monthly_expenses: f64,
    #[arg(long, default_value_t = 0.0, help = "Own capital put into the purchase")]
    own_money: f64,
    #[arg(
        long,
        default_value_t = 0.0,
        help = "One-off costs on top of the purchase (fees, notary, renovation)"
    )]
    extra_costs: f64,
    #[arg(long, default_value_t = 1, help = "Projection horizon in years")]
    years: u32,
    #[arg(long, help = "Model a loan on top of own capital")]
    has_loan: bool,
    #[arg(long, default_value_t = 0.0, help = "Loan principal")]
    loan_amount: f64,
    #[arg(long, default_value_t = 0.0, help = "Annual loan rate in percent")]
    loan_annual_rate: f64,
    #[arg(long, default_value_t = 0, help = "Loan term in years")]
    loan_years: u32,
    #[arg(
        long,
        help = "Use --loan-monthly-payment verbatim instead of the amortized payment"
    )]
    use_manual_loan_payment: bool,
    #[arg(
        long,
        default_value_t = 0.0,
        help = "Manual monthly loan payment override"
    )]
    loan_monthly_payment: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct EvaluatePayload {
    rent_per_month: Option<f64>,
    monthly_expenses: Option<f64>,
    own_money: Option<f64>,
    extra_costs: Option<f64>,
    years: Option<u32>,
    has_loan: Option<bool>,
    loan_amount: Option<f64>,
    loan_annual_rate: Option<f64>,
    loan_years: Option<u32>,
    use_manual_loan_payment: Option<bool>,
    loan_monthly_payment: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ClientQuery {
    client_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct MessageResponse {
    message: String,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Clone)]
struct AppState {
    store: Arc<Mutex<ScenarioStore>>,
    http: reqwest::Client,
}

fn build_scenario(cli: Cli) -> Result<ScenarioInputs, String> {
    for (name, value) in [
        ("--rent-per-month", cli.rent_per_month),
        ("--monthly-expenses", cli.monthly_expenses),
        ("--own-money", cli.own_money),
        ("--extra-costs", cli.extra_costs),
        ("--loan-amount", cli.loan_amount),
        ("--loan-monthly-payment", cli.loan_monthly_payment),
    ] {
        if !value.is_finite() || value < 0.0 {
            return Err(format!("{name} must be a finite value >= 0"));
        }
    }

    if !(0.0..=100.0).contains(&cli.loan_annual_rate) {
        return Err("--loan-annual-rate must be between 0 and 100".to_string());
    }

    if cli.use_manual_loan_payment && !cli.has_loan {
        return Err("--use-manual-loan-payment requires --has-loan".to_string());
    }

    // Loan fields are meaningful only while a loan is modeled.
    Ok(ScenarioInputs {
        has_loan: cli.has_loan,
        loan_amount: if cli.has_loan { cli.loan_amount } else { 0.0 },
        loan_annual_rate: if cli.has_loan { cli.loan_annual_rate } else { 0.0 },
        loan_years: if cli.has_loan { cli.loan_years } else { 0 },
        use_manual_loan_payment: cli.use_manual_loan_payment,
        loan_monthly_payment: if cli.use_manual_loan_payment {
            cli.loan_monthly_payment
        } else {
            0.0
        },
        rent_per_month: cli.rent_per_month,
        monthly_expenses: cli.monthly_expenses,
        own_money: cli.own_money,
        extra_costs: cli.extra_costs,
        years: cli.years,
    })
}

fn default_cli_for_api() -> Cli {
    Cli {
        rent_per_month: 0.0,
        monthly_expenses: 0.0,
        own_money: 0.0,
        extra_costs: 0.0,
        years: 1,
        has_loan: false,
        loan_amount: 0.0,
        loan_annual_rate: 0.0,
        loan_years: 0,
        use_manual_loan_payment: false,
        loan_monthly_payment: 0.0,
    }
}

fn cli_from_payload(payload: EvaluatePayload) -> Cli {
    let mut cli = default_cli_for_api();

    if let Some(v) = payload.rent_per_month {
        cli.rent_per_month = v;
    }
    if let Some(v) = payload.monthly_expenses {
        cli.monthly_expenses = v;
    }
    if let Some(v) = payload.own_money {
        cli.own_money = v;
    }
    if let Some(v) = payload.extra_costs {
        cli.extra_costs = v;
    }
    if let Some(v) = payload.years {
        cli.years = v;
    }
    if let Some(v) = payload.has_loan {
        cli.has_loan = v;
    }
    if let Some(v) = payload.loan_amount {
        cli.loan_amount = v;
    }
    if let Some(v) = payload.loan_annual_rate {
        cli.loan_annual_rate = v;
    }
    if let Some(v) = payload.loan_years {
        cli.loan_years = v;
    }
    if let Some(v) = payload.use_manual_loan_payment {
        cli.use_manual_loan_payment = v;
    }
    if let Some(v) = payload.loan_monthly_payment {
        cli.loan_monthly_payment = v;
    }

    cli
}

pub fn run_cli_calculation<I, T>(args: I) -> Result<String, String>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = Cli::parse_from(args);
    let scenario = build_scenario(cli)?;
    let result = evaluate_scenario(&scenario);
    serde_json::to_string_pretty(&result).map_err(|err| err.to_string())
}

pub async fn run_http_server(port: u16, data_file: PathBuf) -> std::io::Result<()> {
    let state = AppState {
        store: Arc::new(Mutex::new(ScenarioStore::new(data_file))),
        http: reqwest::Client::new(),
    };

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = router(state);

    let listener = TcpListener::bind(addr).await?;
    info!("rentroi HTTP API listening on http://{addr}");
    info!("Local access: http://127.0.0.1:{port}/");

    axum::serve(listener, app).await
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/index.html", get(index_handler))
        .route("/styles.css", get(styles_handler))
        .route("/app.js", get(app_js_handler))
        .route(
            "/api/evaluate",
            get(evaluate_get_handler).post(evaluate_post_handler),
        )
        .route("/api/rates", get(rates_handler))
        .route(
            "/api/scenarios",
            get(list_scenarios_handler).post(save_scenario_handler),
        )
        .route("/api/scenarios/:id", delete(delete_scenario_handler))
        .fallback(not_found_handler)
        .with_state(state)
}

async fn index_handler() -> impl IntoResponse {
    with_cache_control(Html(INDEX_HTML))
}

async fn styles_handler() -> impl IntoResponse {
    with_cache_control((
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        STYLES_CSS,
    ))
}

async fn app_js_handler() -> impl IntoResponse {
    with_cache_control((
        [(
            header::CONTENT_TYPE,
            "application/javascript; charset=utf-8",
        )],
        APP_JS,
    ))
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn evaluate_get_handler(Query(payload): Query<EvaluatePayload>) -> Response {
    evaluate_handler_impl(payload)
}

async fn evaluate_post_handler(Json(payload): Json<EvaluatePayload>) -> Response {
    evaluate_handler_impl(payload)
}

fn evaluate_handler_impl(payload: EvaluatePayload) -> Response {
    match build_scenario(cli_from_payload(payload)) {
        Ok(scenario) => json_response(StatusCode::OK, evaluate_scenario(&scenario)),
        Err(msg) => error_response(StatusCode::BAD_REQUEST, &msg),
    }
}

async fn rates_handler(State(state): State<AppState>) -> Response {
    match fetch_rate_table(&state.http).await {
        Ok(table) => json_response(StatusCode::OK, table),
        Err(err) => {
            error!("exchange rate fetch failed: {err}");
            error_response(StatusCode::BAD_GATEWAY, "Failed to fetch exchange rates")
        }
    }
}

async fn list_scenarios_handler(
    State(state): State<AppState>,
    Query(query): Query<ClientQuery>,
) -> Response {
    // A client without an id has nothing saved yet.
    let Some(client_id) = client_id_from(&query) else {
        return json_response(StatusCode::OK, Vec::<StoredScenario>::new());
    };

    match state.store.lock().await.list(&client_id).await {
        Ok(scenarios) => json_response(StatusCode::OK, scenarios),
        Err(err) => {
            error!("failed to list scenarios: {err}");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to load scenarios",
            )
        }
    }
}

async fn save_scenario_handler(
    State(state): State<AppState>,
    Query(query): Query<ClientQuery>,
    Json(draft): Json<ScenarioDraft>,
) -> Response {
    let Some(client_id) = client_id_from(&query) else {
        return error_response(StatusCode::BAD_REQUEST, "clientId is required");
    };

    match state.store.lock().await.insert(&client_id, draft).await {
        Ok(stored) => json_response(StatusCode::CREATED, stored),
        Err(err) => {
            error!("failed to save scenario: {err}");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to save scenario")
        }
    }
}

async fn delete_scenario_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<ClientQuery>,
) -> Response {
    let Some(client_id) = client_id_from(&query) else {
        return error_response(StatusCode::BAD_REQUEST, "clientId is required");
    };

    match state.store.lock().await.remove(&id, &client_id).await {
        Ok(true) => json_response(
            StatusCode::OK,
            MessageResponse {
                message: "Scenario deleted".to_string(),
            },
        ),
        Ok(false) => error_response(StatusCode::NOT_FOUND, "Scenario not found"),
        Err(err) => {
            error!("failed to delete scenario: {err}");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to delete scenario",
            )
        }
    }
}

fn client_id_from(query: &ClientQuery) -> Option<String> {
    query
        .client_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
}

fn with_cache_control<R: IntoResponse>(response: R) -> Response {
    let mut response = response.into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        "no-store".parse().expect("valid header"),
    );
    response
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        "no-store".parse().expect("valid header"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
fn scenario_from_json(json: &str) -> Result<ScenarioInputs, String> {
    let payload = serde_json::from_str::<EvaluatePayload>(json)
        .map_err(|err| format!("Invalid API JSON payload: {err}"))?;
    build_scenario(cli_from_payload(payload))
}
