//! Alert message formatting (Telegram Markdown).

use crate::risk::ObligationRisk;

/// Render the liquidation alert for one at-risk obligation.
pub fn format_alert(risk: &ObligationRisk) -> String {
    format!(
        "🚨 *Liquidation Opportunity Detected!*\n\n\
         👤 *Owner:* `{}`\n\
         📉 *Health Factor:* {:.2}\n\
         💸 *Borrowed:* ${:.2}\n\
         🏦 *Collateral:* ${:.2}\n\
         ⚖️ *Liquidatable:* ${:.2}\n\
         💰 *Est. Profit (@{:.1}% bonus):* ${:.2}",
        risk.owner,
        risk.health_factor,
        risk.borrowed_value,
        risk.collateral_value,
        risk.liquidatable_value,
        risk.liquidation_bonus_rate * 100.0,
        risk.estimated_profit,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_alert() {
        let risk = ObligationRisk {
            owner: "7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU".to_string(),
            health_factor: 0.8,
            borrowed_value: 1000.0,
            collateral_value: 900.0,
            liquidatable_value: 900.0,
            liquidation_bonus_rate: 0.05,
            estimated_profit: 45.0,
        };

        let msg = format_alert(&risk);
        assert!(msg.starts_with("🚨 *Liquidation Opportunity Detected!*\n\n"));
        assert!(msg.contains("*Owner:* `7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU`\n"));
        assert!(msg.contains("*Health Factor:* 0.80\n"));
        assert!(msg.contains("*Borrowed:* $1000.00\n"));
        assert!(msg.contains("*Collateral:* $900.00\n"));
        assert!(msg.contains("*Liquidatable:* $900.00\n"));
        assert!(msg.ends_with("*Est. Profit (@5.0% bonus):* $45.00"));
    }
}
