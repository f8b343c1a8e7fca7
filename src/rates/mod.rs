use serde::{Deserialize, Serialize};
use thiserror::Error;

const NBU_EXCHANGE_URL: &str = "https://bank.gov.ua/NBUStatService/v1/statdirectory/exchange?json";

#[derive(Debug, Error)]
pub enum RatesError {
    #[error("exchange rate request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("exchange rate feed has no {0} quote")]
    MissingCurrency(&'static str),
    #[error("exchange rate feed returned an unusable {0} rate")]
    InvalidRate(&'static str),
}

/// One entry of the NBU daily feed. The feed carries more fields
/// (numeric code, name, date); only the currency code and rate matter.
#[derive(Debug, Clone, Deserialize)]
pub struct CurrencyQuote {
    pub cc: String,
    pub rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct Rates {
    pub uah: f64,
    pub usd: f64,
    pub eur: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateTable {
    pub base: &'static str,
    pub rates: Rates,
}

pub async fn fetch_rate_table(client: &reqwest::Client) -> Result<RateTable, RatesError> {
    let quotes: Vec<CurrencyQuote> = client
        .get(NBU_EXCHANGE_URL)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    rate_table_from_quotes(&quotes)
}

/// The NBU quotes each currency as UAH per one unit; the UI multiplies
/// UAH amounts by these factors, so the table carries the inverse.
pub fn rate_table_from_quotes(quotes: &[CurrencyQuote]) -> Result<RateTable, RatesError> {
    let usd = uah_per_unit(quotes, "USD")?;
    let eur = uah_per_unit(quotes, "EUR")?;

    Ok(RateTable {
        base: "UAH",
        rates: Rates {
            uah: 1.0,
            usd: 1.0 / usd,
            eur: 1.0 / eur,
        },
    })
}

fn uah_per_unit(quotes: &[CurrencyQuote], code: &'static str) -> Result<f64, RatesError> {
    let quote = quotes
        .iter()
        .find(|quote| quote.cc == code)
        .ok_or(RatesError::MissingCurrency(code))?;
    if !quote.rate.is_finite() || quote.rate <= 0.0 {
        return Err(RatesError::InvalidRate(code));
    }
    Ok(quote.rate)
}
