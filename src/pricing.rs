use crate::currency::{CurrencyConverter, BASE_CURRENCY};
use crate::i18n::{LocaleEntry, TextCatalog};
use serde::Serialize;
use tracing::debug;

/// Discount applied to twelve months when billed yearly.
pub const ANNUAL_DISCOUNT: f64 = 0.20;

/// Monthly list price in USD.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", content = "usd", rename_all = "lowercase")]
pub enum PlanPrice {
    Free,
    Fixed(f64),
    Custom,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricingPlan {
    pub id: &'static str,
    pub price: PlanPrice,
    pub popular: bool,
}

impl PricingPlan {
    fn name_key(&self) -> String {
        format!("plan.{}.name", self.id)
    }

    fn cta_key(&self) -> String {
        format!("plan.{}.cta", self.id)
    }
}

/// A plan with prices converted and texts resolved for one locale.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocalizedPlan {
    pub id: String,
    pub name: String,
    pub cta: String,
    pub currency: String,
    pub popular: bool,
    /// `None` for custom-priced plans
    pub monthly_price: Option<f64>,
    pub annual_price: Option<f64>,
    pub display_price: String,
    pub display_annual_price: String,
}

#[derive(Debug, Clone)]
pub struct PricingCatalog {
    plans: Vec<PricingPlan>,
}

impl PricingCatalog {
    pub fn new(plans: Vec<PricingPlan>) -> Self {
        Self { plans }
    }

    pub fn builtin() -> Self {
        Self::new(vec![
            PricingPlan {
                id: "free",
                price: PlanPrice::Free,
                popular: false,
            },
            PricingPlan {
                id: "starter",
                price: PlanPrice::Fixed(9.99),
                popular: false,
            },
            PricingPlan {
                id: "professional",
                price: PlanPrice::Fixed(29.99),
                popular: true,
            },
            PricingPlan {
                id: "enterprise",
                price: PlanPrice::Custom,
                popular: false,
            },
        ])
    }

    /// Currency prices are shown in.
    ///
    /// An override wins when the rate table knows it; otherwise the locale's
    /// own currency if it has a rate; otherwise USD, so a price is never
    /// labelled with a currency it was not converted into.
    pub fn display_currency(
        locale: &LocaleEntry,
        override_currency: Option<&str>,
        converter: &CurrencyConverter,
    ) -> String {
        if let Some(requested) = override_currency.map(str::trim).filter(|c| !c.is_empty()) {
            if converter.has_rate(requested) {
                return requested.to_ascii_uppercase();
            }
            debug!("Ignoring currency override without a rate: {}", requested);
        }

        let own = converter.currency_for_locale(locale);
        if converter.has_rate(own) {
            own.to_string()
        } else {
            BASE_CURRENCY.to_string()
        }
    }

    pub fn localize(
        &self,
        locale: &LocaleEntry,
        override_currency: Option<&str>,
        converter: &CurrencyConverter,
        texts: &TextCatalog,
    ) -> Vec<LocalizedPlan> {
        let currency = Self::display_currency(locale, override_currency, converter);
        let free = texts.resolve("price.free", &locale.code);
        let custom = texts.resolve("price.custom", &locale.code);

        self.plans
            .iter()
            .map(|plan| {
                let (monthly, annual) = match plan.price {
                    PlanPrice::Free => (Some(0.0), Some(0.0)),
                    PlanPrice::Fixed(usd) => (
                        Some(converter.convert(usd, BASE_CURRENCY, &currency)),
                        Some(converter.convert(
                            usd * 12.0 * (1.0 - ANNUAL_DISCOUNT),
                            BASE_CURRENCY,
                            &currency,
                        )),
                    ),
                    PlanPrice::Custom => (None, None),
                };

                let display = |amount: Option<f64>| match (plan.price, amount) {
                    (PlanPrice::Free, _) => free.to_string(),
                    (_, Some(amount)) => converter.format(amount, &currency, &locale.code),
                    (_, None) => custom.to_string(),
                };

                LocalizedPlan {
                    id: plan.id.to_string(),
                    name: texts.resolve(&plan.name_key(), &locale.code).to_string(),
                    cta: texts.resolve(&plan.cta_key(), &locale.code).to_string(),
                    currency: currency.clone(),
                    popular: plan.popular,
                    monthly_price: monthly,
                    annual_price: annual,
                    display_price: display(monthly),
                    display_annual_price: display(annual),
                }
            })
            .collect()
    }
}
