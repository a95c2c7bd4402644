//! Plain-text response rendering
//!
//! Turns structured results into the answers users see. This layer only
//! consumes result shapes; it never talks to providers. Article tables
//! display the time weight scaled by ten ("2.4x") while scoring keeps the
//! raw weight — the two scalings are intentionally different.

use crate::market::{
    IndexSnapshot, MarketActivity, PortfolioReport, SectorPerformance, StockAnalysis,
    WatchlistReport,
};
use crate::api::QuoteSummary;
use crate::sentiment::{MarketPulse, ScoredArticle, SentimentSummary};
use crate::signals::TradingSignals;

/// Asked when no symbol could be resolved for a symbol-bound intent
pub const CLARIFY: &str = "Could you please specify the full company name or stock symbol?";

/// Asked when a trading-signal query names no resolvable stock
pub const CLARIFY_SIGNALS: &str =
    "Please specify which stock's trading signals you'd like to know about.";

/// Default answer when nothing else applies
pub const HELP: &str =
    "I can help you with stock prices, news, and market terms. What would you like to know?";

/// Shown when news exists but scoring found nothing to analyze
pub const NO_NEWS: &str = "No recent news found for analysis.";

/// Provider failure message for a named view
pub fn unavailable(what: &str) -> String {
    format!("Unable to fetch {what} at the moment.")
}

/// Price snapshot answer
pub fn price_details(summary: &QuoteSummary) -> String {
    let mut out = format!(
        "The current price of {} is ₹{:.2}. Today's high is ₹{:.2} and low is ₹{:.2}. Volume traded: {}.",
        summary.symbol, summary.current_price, summary.day_high, summary.day_low, summary.volume
    );

    if let Some(previous) = summary.previous_close {
        let change = summary.current_price - previous;
        let change_pct = if previous != 0.0 {
            (change / previous) * 100.0
        } else {
            0.0
        };
        out.push_str(&format!(" Change: {change:+.2} ({change_pct:+.2}%)."));
    }
    if let Some(pe) = summary.pe_ratio {
        out.push_str(&format!(" P/E ratio: {pe:.2}."));
    }
    if let Some(cap) = summary.market_cap {
        out.push_str(&format!(" Market Cap: ₹{:.2} Cr.", cap / 1.0e7));
    }
    if let (Some(high), Some(low)) = (summary.fifty_two_week_high, summary.fifty_two_week_low) {
        out.push_str(&format!(
            "\n52-week High: ₹{high:.2}, 52-week Low: ₹{low:.2}."
        ));
    }

    out
}

/// Trend analysis answer
pub fn analysis(report: &StockAnalysis) -> String {
    let trend = if report.price_change > 0.0 {
        "upward"
    } else {
        "downward"
    };

    let mut out = format!(
        "{} is currently trading at ₹{:.2}, showing a {} trend with {:.2}% change.",
        report.symbol,
        report.current_price,
        trend,
        report.price_change_pct.abs()
    );

    if let Some(ma_20) = report.ma_20 {
        let side = if report.current_price > ma_20 {
            "above"
        } else {
            "below"
        };
        out.push_str(&format!(
            " The stock is trading {side} its 20-day moving average."
        ));
    }

    out.push_str("\n\nTechnical Analysis:\n");
    if let Some(ma_20) = report.ma_20 {
        out.push_str(&format!("- 20-day MA: ₹{ma_20:.2}\n"));
    }
    if let Some(ma_50) = report.ma_50 {
        out.push_str(&format!("- 50-day MA: ₹{ma_50:.2}\n"));
    }
    if let Some(high) = report.fifty_two_week_high {
        out.push_str(&format!("- 52-week High: ₹{high:.2}\n"));
    }
    if let Some(low) = report.fifty_two_week_low {
        out.push_str(&format!("- 52-week Low: ₹{low:.2}\n"));
    }

    out
}

/// Trading signals answer
pub fn trading_signals(signals: &TradingSignals) -> String {
    let mut out = format!(
        "Trading Signals for {}:\nCurrent Price: ₹{:.2}\n",
        signals.symbol, signals.current_price
    );

    for (kind, verdict) in &signals.verdicts {
        out.push_str(&format!("{kind} Signal: {verdict}\n"));
    }
    if let (Some(price), Some(change)) = (signals.predicted_price, signals.predicted_change_pct) {
        out.push_str(&format!(
            "Predicted Price: ₹{price:.2} ({change:+.2}%)\n"
        ));
    }
    out.push_str(&format!("Overall Signal: {}", signals.overall));

    out
}

/// Sentiment report answer with the recent article table
pub fn sentiment_report(
    symbol: &str,
    summary: &SentimentSummary,
    pulse: &MarketPulse,
    recent: &[ScoredArticle],
) -> String {
    let mut out = format!(
        "Sentiment Analysis for {}:\nOverall Sentiment Score: {:.2}\nNews Sentiment: {}\nPositive {:.0}% | Neutral {:.0}% | Negative {:.0}%\nMarket Consensus: {} (Signal: {})\n\nNews Analysis:\n- Positive News: {}\n- Negative News: {}\n- Neutral News: {}\nTotal News Analyzed: {}\n",
        symbol,
        summary.average_score,
        summary.tone,
        summary.positive_pct,
        summary.neutral_pct,
        summary.negative_pct,
        pulse.consensus,
        pulse.signal_strength,
        summary.positive,
        summary.negative,
        summary.neutral,
        summary.total,
    );

    if !recent.is_empty() {
        out.push_str("\nRecent News:\n");
        for article in recent {
            out.push_str(&format!(
                "• {}\n  Sentiment: {} (Confidence: {:.2}, Weight: {:.1}x)\n  Time: {}\n",
                article.title,
                article.sentiment.as_str().to_uppercase(),
                article.confidence,
                article.time_weight * 10.0,
                article.date,
            ));
        }
    }

    out
}

/// Plain news listing answer
pub fn news_list(symbol: &str, articles: &[ScoredArticle]) -> String {
    let mut out = format!("Recent news for {symbol}:\n");
    for article in articles {
        out.push_str(&format!(
            "• {} ({})\n",
            article.title,
            article.sentiment.as_str().to_uppercase()
        ));
    }
    out
}

/// Market status answer
pub fn market_status(open: bool) -> String {
    if open {
        "The Indian market is currently Open (trading hours 09:15-15:30 IST, Mon-Fri).".to_string()
    } else {
        "The Indian market is currently Closed (trading hours 09:15-15:30 IST, Mon-Fri)."
            .to_string()
    }
}

fn index_line(snapshot: &IndexSnapshot) -> String {
    format!(
        "{}: ₹{:.2} ({:+.2}%)\nHigh: ₹{:.2}, Low: ₹{:.2}\n",
        snapshot.name, snapshot.current, snapshot.change_pct, snapshot.high, snapshot.low
    )
}

/// Market activity answer
pub fn market_activity(activity: &MarketActivity) -> String {
    let status = if activity.market_open { "Open" } else { "Closed" };
    let mut out = format!("Market Status: {status}\n");
    out.push_str(&index_line(&activity.nifty));
    out.push_str(&index_line(&activity.sensex));

    if !activity.sectors.is_empty() {
        out.push_str("\nSector Performance:\n");
        out.push_str(&sector_lines(&activity.sectors));
    }

    out
}

/// Sector performance block
pub fn sector_lines(sectors: &[SectorPerformance]) -> String {
    let mut out = String::new();
    for sector in sectors {
        out.push_str(&format!("{}: {:+.2}%\n", sector.name, sector.change_pct));
    }
    out
}

/// Sector performance answer
pub fn sector_performance(sectors: &[SectorPerformance]) -> String {
    format!("Sector Performance:\n{}", sector_lines(sectors))
}

/// Portfolio answer
pub fn portfolio(report: &PortfolioReport) -> String {
    let mut out = String::from("Portfolio Analysis:\n");
    for entry in &report.entries {
        out.push_str(&format!(
            "\n{}:\nPrice: ₹{:.2}\nChange: {:+.2}%\n",
            entry.symbol, entry.price, entry.change_pct
        ));
    }
    out.push_str(&format!("\nTotal Value: ₹{:.2}", report.total_value));
    out.push_str(&format!("\nTotal Change: {:+.2}%", report.total_change_pct));
    out
}

/// Watchlist answer
pub fn watchlist(report: &WatchlistReport) -> String {
    let mut out = String::from("Watchlist Analysis:\n");
    for entry in &report.entries {
        out.push_str(&format!(
            "\n{}:\nPrice: ₹{:.2}\nChange: {:+.2}%\nVolume: {}\n",
            entry.symbol, entry.price, entry.change_pct, entry.volume
        ));
    }
    if !report.alerts.is_empty() {
        out.push_str("\nAlerts:\n");
        for alert in &report.alerts {
            out.push_str(&format!("- {alert}\n"));
        }
    }
    out
}
