//! Announcement text shared by every channel.
//!
//! Each renderer takes a [`Markup`] so the same wording can be emitted as
//! Discord markdown, Telegram markdown or plain text.

use crate::events::{
    CexMovementInfo, CfeVersionsInfo, EpochInfo, FundingInfo, IncomingLiquidityInfo,
    RedemptionInfo, SwapInfo, SwapLimitsInfo,
};
use insights_sdk::objects::Asset;
use rust_decimal::{Decimal, RoundingStrategy};
use std::fmt::Write;
use time::macros::format_description;

const SUB_1K: &str = "🦐";
const SUB_2_5K: &str = "🐟";
const SUB_5K: &str = "🦀";
const SUB_10K: &str = "🦈";
const WHALE: &str = "🐳";

/// Text flavour of a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Markup {
    /// Discord markdown: `**bold**`, `[text](url)`.
    Discord,
    /// Telegram legacy Markdown: `*bold*`, `[text](url)`.
    Telegram,
    /// No markup; links are printed bare.
    Plain,
}

impl Markup {
    /// Bold `text`, which may contain markup characters of its own.
    pub fn bold(self, text: &str) -> String {
        match self {
            Markup::Discord => format!("**{}**", self.escape(text)),
            // Legacy Markdown reads everything up to the closing `*` literally,
            // so only an asterisk needs the entity closed and reopened.
            Markup::Telegram => format!("*{}*", text.replace('*', "*\\**")),
            Markup::Plain => text.to_string(),
        }
    }

    /// Escape text placed outside of any entity, such as an account alias.
    pub fn escape(self, text: &str) -> String {
        let special: &[char] = match self {
            Markup::Discord => &['\\', '*', '_', '~', '`', '|'],
            Markup::Telegram => &['_', '*', '`', '['],
            Markup::Plain => return text.to_string(),
        };
        let mut escaped = String::with_capacity(text.len());
        for c in text.chars() {
            if special.contains(&c) {
                escaped.push('\\');
            }
            escaped.push(c);
        }
        escaped
    }

    pub fn link(self, text: &str, url: &str) -> String {
        match self {
            Markup::Discord | Markup::Telegram => format!("[{text}]({url})"),
            Markup::Plain => url.to_string(),
        }
    }
}

/// Size indicator by USD value.
pub fn size_emoji(value_usd: Decimal) -> &'static str {
    if value_usd < Decimal::from(1_000) {
        SUB_1K
    } else if value_usd < Decimal::from(2_500) {
        SUB_2_5K
    } else if value_usd < Decimal::from(5_000) {
        SUB_5K
    } else if value_usd < Decimal::from(10_000) {
        SUB_10K
    } else {
        WHALE
    }
}

/// At least two decimals, at most the asset's precision, no trailing zeros
/// beyond the second.
pub fn format_amount(amount: Decimal, asset: Asset) -> String {
    let mut value = amount
        .round_dp_with_strategy(asset.info().decimals, RoundingStrategy::MidpointAwayFromZero)
        .normalize();
    if value.scale() < 2 {
        value.rescale(2);
    }
    value.to_string()
}

/// Two decimal places, rounded half away from zero.
pub fn format_usd(value: Decimal) -> String {
    let mut value = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    value.rescale(2);
    value.to_string()
}

fn format_flip(amount: Decimal) -> String {
    format_amount(amount, Asset::Flip)
}

pub fn swap(info: &SwapInfo, explorer_url: &str, markup: Markup) -> String {
    let from = format!(
        "{} {}",
        format_amount(info.deposit_amount, info.source_asset),
        info.source_asset
    );
    let to = format!(
        "{} {}",
        format_amount(info.egress_amount, info.destination_asset),
        info.destination_asset
    );
    let url = format!("{explorer_url}{}", info.id);
    format!(
        "{} Swapped {} (${}) → {} (${}) // {}",
        size_emoji(info.deposit_value_usd),
        markup.bold(&from),
        format_usd(info.deposit_value_usd),
        markup.bold(&to),
        format_usd(info.egress_value_usd),
        markup.link("view swap on explorer", &url),
    )
}

pub fn incoming_liquidity(info: &IncomingLiquidityInfo, markup: Markup) -> String {
    let amount = format!("{} {}", format_amount(info.amount, info.asset), info.asset);
    let mut text = format!(
        "💵 Incoming liquidity! {} (${}) added to the {} pool",
        markup.bold(&amount),
        format_usd(info.value_usd),
        info.asset,
    );
    if let Some(provider) = &info.provider {
        let _ = write!(text, " by {}", markup.escape(&provider.display_name()));
    }
    text
}

pub fn epoch(info: &EpochInfo, markup: Markup) -> String {
    format!(
        "⚡ Epoch {} started with {} authorities. Minimum bond is {}, total bonded {} FLIP.",
        markup.bold(&info.id.to_string()),
        info.authority_count,
        markup.bold(&format!("{} FLIP", format_flip(info.bond))),
        format_flip(info.total_bonded),
    )
}

pub fn funding(info: &FundingInfo, markup: Markup) -> String {
    format!(
        "🪙 Validator {} added {} during epoch {}",
        markup.bold(&info.validator.display_name()),
        markup.bold(&format!("{} FLIP", format_flip(info.amount))),
        info.epoch,
    )
}

pub fn redemption(info: &RedemptionInfo, markup: Markup) -> String {
    format!(
        "💸 Validator {} redeemed {} during epoch {}",
        markup.bold(&info.validator.display_name()),
        markup.bold(&format!("{} FLIP", format_flip(info.amount))),
        info.epoch,
    )
}

pub fn cex_movement(info: &CexMovementInfo, markup: Markup) -> String {
    let net = info.net_to_cex();
    let direction = if net.is_sign_negative() {
        "📤 Net outflow"
    } else {
        "📥 Net inflow"
    };
    format!(
        "🏦 CEX movements on {}: {} FLIP moved to exchanges, {} FLIP moved out. {} of {}",
        format_date(info.date),
        format_flip(info.flip_to_cex),
        format_flip(info.flip_from_cex),
        direction,
        markup.bold(&format!("{} FLIP", format_flip(net.abs()))),
    )
}

pub fn cfe_versions(info: &CfeVersionsInfo, markup: Markup) -> String {
    let mut text = format!(
        "🧮 CFE versions on {} across {} validators:",
        format_date(info.date),
        info.total_validators(),
    );
    for version in info.versions.iter().rev() {
        let _ = write!(
            text,
            "\n{}: {} validators ({} online)",
            markup.bold(&version.version.to_string()),
            version.validators,
            version.online,
        );
    }
    text
}

pub fn swap_limits(info: &SwapLimitsInfo, markup: Markup) -> String {
    let mut text = format!(
        "🔒 Swap limits as of node version {}:",
        markup.bold(&info.node_version.to_string())
    );
    for limit in &info.limits {
        let maximum = match limit.maximum {
            Some(maximum) => format!("{} {}", format_amount(maximum, limit.asset), limit.asset),
            None => "unlimited".to_string(),
        };
        let _ = write!(text, "\n{}: {maximum}", limit.asset);
    }
    text
}

fn format_date(date: time::Date) -> String {
    date.format(format_description!("[year]-[month]-[day]"))
        .unwrap_or_else(|_| date.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::AccountRef;
    use std::str::FromStr;
    use time::OffsetDateTime;

    fn dec(value: &str) -> Decimal {
        Decimal::from_str(value).unwrap()
    }

    #[test]
    fn test_size_emoji_tiers() {
        assert_eq!(size_emoji(dec("999.99")), "🦐");
        assert_eq!(size_emoji(dec("1000")), "🐟");
        assert_eq!(size_emoji(dec("2500")), "🦀");
        assert_eq!(size_emoji(dec("9999")), "🦈");
        assert_eq!(size_emoji(dec("10000")), "🐳");
    }

    #[test]
    fn test_amount_precision() {
        assert_eq!(format_amount(dec("1"), Asset::Btc), "1.00");
        assert_eq!(format_amount(dec("0.123456789"), Asset::Btc), "0.12345679");
        assert_eq!(format_amount(dec("1500.100000"), Asset::Usdc), "1500.10");
        assert_eq!(format_usd(dec("4600.005")), "4600.01");
        assert_eq!(format_usd(dec("12")), "12.00");
    }

    #[test]
    fn test_swap_text() {
        let info = SwapInfo {
            id: 4521,
            source_asset: Asset::Btc,
            destination_asset: Asset::Eth,
            deposit_amount: dec("0.5"),
            deposit_value_usd: dec("21000"),
            egress_amount: dec("9.1"),
            egress_value_usd: dec("20950.5"),
            executed_at: OffsetDateTime::UNIX_EPOCH,
        };

        assert_eq!(
            swap(&info, "https://scan.chainflip.io/swaps/", Markup::Discord),
            "🐳 Swapped **0.50 BTC** ($21000.00) → **9.10 ETH** ($20950.50) \
             // [view swap on explorer](https://scan.chainflip.io/swaps/4521)"
        );
        assert!(
            swap(&info, "https://scan.chainflip.io/swaps/", Markup::Plain)
                .ends_with("// https://scan.chainflip.io/swaps/4521")
        );
    }

    fn chorus_one(alias: &str) -> AccountRef {
        AccountRef {
            alias: Some(alias.to_string()),
            id_ss58: "cFNwGhiHhF5PsKEVJG4zQRDTnkbXpKNWXb5xsnJQTqBqy4j4n".into(),
        }
    }

    #[test]
    fn test_alias_markup_is_escaped() {
        let funding_info = FundingInfo {
            id: 7,
            amount: dec("1500"),
            epoch: 150,
            validator: chorus_one("Chorus_One"),
            funded_at: OffsetDateTime::UNIX_EPOCH,
        };
        assert_eq!(
            funding(&funding_info, Markup::Telegram),
            "🪙 Validator *Chorus_One* added *1500.00 FLIP* during epoch 150"
        );
        assert!(funding(&funding_info, Markup::Discord).contains("**Chorus\\_One**"));
        assert!(funding(&funding_info, Markup::Plain).contains("Validator Chorus_One added"));

        let liquidity_info = IncomingLiquidityInfo {
            id: 9,
            asset: Asset::Usdc,
            amount: dec("25000"),
            value_usd: dec("25000"),
            provider: Some(chorus_one("Chorus_One")),
            deposited_at: OffsetDateTime::UNIX_EPOCH,
        };
        assert!(
            incoming_liquidity(&liquidity_info, Markup::Telegram).ends_with(" by Chorus\\_One")
        );

        let redemption_info = RedemptionInfo {
            id: 8,
            amount: dec("10"),
            epoch: 150,
            validator: chorus_one("Chorus*One"),
            redeemed_at: OffsetDateTime::UNIX_EPOCH,
        };
        assert!(redemption(&redemption_info, Markup::Telegram).contains("*Chorus*\\**One*"));
    }
}
