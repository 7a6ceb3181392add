use iso_currency::Currency;

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum MoneyError {
    #[error("amount must be a finite number greater than zero, got {0}")]
    NotPositive(f64),

    #[error("amount {0} is smaller than the currency's smallest unit")]
    BelowSmallestUnit(f64),

    #[error("amount {0} is too large")]
    TooLarge(f64),
}

/// An amount held in the currency's minor units (paise for INR, cents for USD).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Money {
    pub currency: Currency,
    pub minor_units: i64,
}

impl Money {
    pub fn from_minor(currency: Currency, minor_units: i64) -> Self {
        Self {
            currency,
            minor_units,
        }
    }

    /// Converts an amount in major units, rounding to the nearest minor unit.
    pub fn from_major(currency: Currency, amount: f64) -> Result<Self, MoneyError> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(MoneyError::NotPositive(amount));
        }
        let minor = (amount * subunit_fraction(currency) as f64).round();
        if minor < 1.0 {
            return Err(MoneyError::BelowSmallestUnit(amount));
        }
        // i64::MAX is not representable as f64; stay well below it.
        if minor >= 9.0e15 {
            return Err(MoneyError::TooLarge(amount));
        }
        Ok(Self::from_minor(currency, minor as i64))
    }

    pub fn major_units(&self) -> f64 {
        self.minor_units as f64 / subunit_fraction(self.currency) as f64
    }

    pub fn currency_code(&self) -> &'static str {
        self.currency.code()
    }
}

fn subunit_fraction(currency: Currency) -> i64 {
    currency.subunit_fraction().unwrap_or(1u16).into()
}
