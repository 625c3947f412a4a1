//! JSON scenarios replayed against a simulated pool, vault and admin.

use alloy_primitives::{Address, I256, U256};
use anyhow::{anyhow, Context, Result};
use hypervisor_admin::{Admin, AdminConfig, AdminError, AdminEvent};
use hypervisor_strategy::{RangeStrategy, StrategyError};
use hypervisor_vault::{
    Hypervisor, PoolAdapter, PoolError, RebalanceParams, SimPool, VaultConfig, VaultError,
    VaultEvent, VaultState,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Token amounts written as decimal strings, `0x` hex strings or JSON integers.
mod amount {
    use alloy_primitives::U256;
    use serde::{de, Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    pub enum Raw {
        Number(u64),
        Text(String),
    }

    pub fn parse(raw: Raw) -> Result<U256, String> {
        match raw {
            Raw::Number(value) => Ok(U256::from(value)),
            Raw::Text(text) => text
                .trim()
                .parse::<U256>()
                .map_err(|error| format!("invalid amount {text:?}: {error}")),
        }
    }

    pub fn serialize<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
        parse(Raw::deserialize(deserializer)?).map_err(de::Error::custom)
    }

    pub mod option {
        use super::{parse, Raw};
        use alloy_primitives::U256;
        use serde::{de, Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            value: &Option<U256>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(value) => super::serialize(value, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<U256>, D::Error> {
            Option::<Raw>::deserialize(deserializer)?
                .map(parse)
                .transpose()
                .map_err(de::Error::custom)
        }
    }
}

/// A vault deployment plus the ordered actions to run against it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    #[serde(default)]
    pub name: Option<String>,
    pub pool: PoolSpec,
    #[serde(default)]
    pub vault: VaultConfig,
    #[serde(default)]
    pub admin: AdminConfig,
    pub roles: RolesSpec,
    #[serde(default)]
    pub addresses: Addresses,
    /// Clock at the first step, in seconds
    #[serde(default)]
    pub start_time: u64,
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PoolSpec {
    pub tick: i32,
    #[serde(default = "default_tick_spacing")]
    pub tick_spacing: i32,
    #[serde(default = "default_fee_pips")]
    pub fee_pips: u32,
    /// Full-range liquidity owned by other providers
    #[serde(default, with = "amount")]
    pub background_liquidity: U256,
}

fn default_tick_spacing() -> i32 {
    60
}

fn default_fee_pips() -> u32 {
    3000
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RolesSpec {
    pub owner: Address,
    pub advisor: Address,
}

/// Contract and token addresses; the defaults are fixed placeholders.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Addresses {
    pub vault: Address,
    pub admin: Address,
    pub token0: Address,
    pub token1: Address,
}

impl Default for Addresses {
    fn default() -> Self {
        Self {
            vault: Address::with_last_byte(0xaa),
            admin: Address::with_last_byte(0xad),
            token0: Address::with_last_byte(0x10),
            token1: Address::with_last_byte(0x11),
        }
    }
}

/// Exact-input swap; the direction is explicit rather than signed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SwapSpec {
    #[serde(with = "amount")]
    pub amount: U256,
    pub zero_for_one: bool,
}

impl SwapSpec {
    fn signed(&self) -> Result<I256, VaultError> {
        let quantity = I256::try_from(self.amount)
            .map_err(|_| VaultError::Math(hypervisor_vault::MathError::Overflow))?;
        Ok(if self.zero_for_one { quantity } else { -quantity })
    }
}

/// One scenario action.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum Step {
    Deposit {
        sender: Address,
        #[serde(with = "amount")]
        amount0: U256,
        #[serde(with = "amount")]
        amount1: U256,
        /// Defaults to the sender
        #[serde(default)]
        recipient: Option<Address>,
    },
    Withdraw {
        sender: Address,
        /// Defaults to the sender's whole balance
        #[serde(default, with = "amount::option")]
        shares: Option<U256>,
        #[serde(default)]
        recipient: Option<Address>,
    },
    Rebalance {
        caller: Address,
        base_lower: i32,
        base_upper: i32,
        limit_lower: i32,
        limit_upper: i32,
        fee_recipient: Address,
        #[serde(default)]
        swap: Option<SwapSpec>,
    },
    /// Rebalance with ranges and swap chosen by a [`RangeStrategy`]
    AutoRebalance {
        caller: Address,
        #[serde(default)]
        strategy: RangeStrategy,
        fee_recipient: Address,
        #[serde(default)]
        tolerance_bps: u32,
    },
    /// Trade against the pool as an outside trader
    Swap(SwapSpec),
    Prepare {
        caller: Address,
        new_owner: Address,
    },
    Fulfill {
        new_owner: Address,
    },
    Cancel {
        caller: Address,
    },
    SetDepositMax {
        caller: Address,
        #[serde(with = "amount")]
        deposit_max0: U256,
        #[serde(with = "amount")]
        deposit_max1: U256,
    },
    EmergencyWithdraw {
        caller: Address,
        token: Address,
        #[serde(with = "amount")]
        amount: U256,
    },
    AdvanceTime {
        seconds: u64,
    },
}

impl Step {
    pub fn action(&self) -> &'static str {
        match self {
            Step::Deposit { .. } => "deposit",
            Step::Withdraw { .. } => "withdraw",
            Step::Rebalance { .. } => "rebalance",
            Step::AutoRebalance { .. } => "auto-rebalance",
            Step::Swap(_) => "swap",
            Step::Prepare { .. } => "prepare",
            Step::Fulfill { .. } => "fulfill",
            Step::Cancel { .. } => "cancel",
            Step::SetDepositMax { .. } => "set-deposit-max",
            Step::EmergencyWithdraw { .. } => "emergency-withdraw",
            Step::AdvanceTime { .. } => "advance-time",
        }
    }
}

/// Why a step failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepFailure {
    pub kind: &'static str,
    pub message: String,
}

impl From<VaultError> for StepFailure {
    fn from(error: VaultError) -> Self {
        Self {
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

impl From<AdminError> for StepFailure {
    fn from(error: AdminError) -> Self {
        Self {
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

impl From<PoolError> for StepFailure {
    fn from(error: PoolError) -> Self {
        VaultError::from(error).into()
    }
}

impl From<StrategyError> for StepFailure {
    fn from(error: StrategyError) -> Self {
        Self {
            kind: "Strategy",
            message: error.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Ok,
    Error,
}

/// Outcome of one step.
#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub index: usize,
    pub action: &'static str,
    pub status: StepStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<&'static str>,
    pub detail: String,
}

/// Everything a scenario run produced.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub steps: Vec<StepReport>,
    pub clock: u64,
    pub final_state: VaultState,
    pub admin_holdings: Balances,
    pub vault_events: Vec<VaultEvent>,
    pub admin_events: Vec<AdminEvent>,
}

/// Tokens held by the admin after emergency withdrawals.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Balances {
    pub token0: U256,
    pub token1: U256,
}

impl ScenarioReport {
    pub fn failures(&self) -> impl Iterator<Item = &StepReport> {
        self.steps
            .iter()
            .filter(|step| step.status == StepStatus::Error)
    }
}

/// Live objects of a scenario.
#[derive(Debug)]
pub struct Simulation {
    admin: Admin,
    vault: Hypervisor<SimPool>,
    clock: u64,
}

impl Simulation {
    /// Deploys the pool, an admin and a vault owned by that admin.
    pub fn new(scenario: &Scenario) -> Result<Self> {
        let spec = &scenario.pool;
        let background = u128::try_from(spec.background_liquidity)
            .map_err(|_| anyhow!("background liquidity does not fit in u128"))?;
        let mut pool = SimPool::new(spec.tick, spec.tick_spacing, spec.fee_pips)
            .context("Invalid pool")?;
        if background > 0 {
            pool = pool
                .with_background_liquidity(background)
                .context("Invalid background liquidity")?;
        }

        let addresses = &scenario.addresses;
        let admin = Admin::new(
            addresses.admin,
            scenario.roles.owner,
            scenario.roles.advisor,
            scenario.admin.clone(),
        )
        .context("Invalid roles")?;
        let vault = Hypervisor::new(
            addresses.vault,
            addresses.token0,
            addresses.token1,
            addresses.admin,
            pool,
            scenario.vault.clone(),
        );

        Ok(Self {
            admin,
            vault,
            clock: scenario.start_time,
        })
    }

    /// Runs one step; failures leave the simulation unchanged.
    pub fn apply(&mut self, step: &Step) -> Result<String, StepFailure> {
        debug!(action = step.action(), clock = self.clock, "step");
        match step {
            Step::Deposit {
                sender,
                amount0,
                amount1,
                recipient,
            } => {
                let recipient = recipient.unwrap_or(*sender);
                let shares = self.vault.deposit(*sender, *amount0, *amount1, recipient)?;
                Ok(format!("minted {shares} shares to {recipient}"))
            }
            Step::Withdraw {
                sender,
                shares,
                recipient,
            } => {
                let shares = shares.unwrap_or_else(|| self.vault.balance_of(*sender));
                let recipient = recipient.unwrap_or(*sender);
                let (amount0, amount1) = self.vault.withdraw(*sender, shares, recipient)?;
                Ok(format!(
                    "burned {shares} shares for {amount0} token0 and {amount1} token1"
                ))
            }
            Step::Rebalance {
                caller,
                base_lower,
                base_upper,
                limit_lower,
                limit_upper,
                fee_recipient,
                swap,
            } => {
                let mut params = RebalanceParams::new(
                    *base_lower,
                    *base_upper,
                    *limit_lower,
                    *limit_upper,
                    *fee_recipient,
                );
                if let Some(swap) = swap {
                    params = params.with_swap(swap.signed()?);
                }
                self.rebalance(*caller, &params)
            }
            Step::AutoRebalance {
                caller,
                strategy,
                fee_recipient,
                tolerance_bps,
            } => {
                let (amount0, amount1) = self.vault.total_amounts()?;
                let tick = self.vault.pool().current_tick()?;
                let sqrt_price = self.vault.pool().current_price()?;
                let plan = strategy.plan(tick, amount0, amount1, sqrt_price)?;
                let swap = strategy.swap_to_balance(amount0, amount1, sqrt_price, *tolerance_bps)?;
                let params = plan.to_params(*fee_recipient).with_swap(swap);
                self.rebalance(*caller, &params)
            }
            Step::Swap(swap) => {
                let (amount_in, amount_out) = self
                    .vault
                    .pool_mut()
                    .swap(swap.amount, swap.zero_for_one)?;
                let tick = self.vault.pool().tick();
                Ok(format!("{amount_in} in, {amount_out} out, tick now {tick}"))
            }
            Step::Prepare { caller, new_owner } => {
                let request = self
                    .admin
                    .prepare(*caller, &self.vault, *new_owner, self.clock)?;
                Ok(format!(
                    "transfer to {new_owner} eligible at {}",
                    request.eligible_at
                ))
            }
            Step::Fulfill { new_owner } => {
                self.admin.fulfill(&mut self.vault, *new_owner, self.clock)?;
                Ok(format!("vault now owned by {new_owner}"))
            }
            Step::Cancel { caller } => {
                let request = self.admin.cancel(*caller, self.vault.address())?;
                Ok(format!(
                    "cancelled transfer to {}",
                    request.proposed_new_owner
                ))
            }
            Step::SetDepositMax {
                caller,
                deposit_max0,
                deposit_max1,
            } => {
                self.admin
                    .set_deposit_max(*caller, &mut self.vault, *deposit_max0, *deposit_max1)?;
                Ok(format!("deposit caps {deposit_max0} / {deposit_max1}"))
            }
            Step::EmergencyWithdraw {
                caller,
                token,
                amount,
            } => {
                self.admin
                    .emergency_withdraw(*caller, &mut self.vault, *token, *amount)?;
                Ok(format!("moved {amount} of {token} to the admin"))
            }
            Step::AdvanceTime { seconds } => {
                self.clock = self.clock.saturating_add(*seconds);
                Ok(format!("clock now {}", self.clock))
            }
        }
    }

    fn rebalance(&mut self, caller: Address, params: &RebalanceParams) -> Result<String, StepFailure> {
        let outcome = self.admin.rebalance(caller, &mut self.vault, params)?;
        Ok(format!(
            "base [{}, {}] liquidity {}, limit [{}, {}] liquidity {}",
            outcome.base.tick_lower,
            outcome.base.tick_upper,
            outcome.base.liquidity,
            outcome.limit.tick_lower,
            outcome.limit.tick_upper,
            outcome.limit.liquidity
        ))
    }

    /// Final report after all steps.
    pub fn report(&self, name: Option<String>, steps: Vec<StepReport>) -> Result<ScenarioReport> {
        Ok(ScenarioReport {
            name,
            steps,
            clock: self.clock,
            final_state: self.vault.state()?,
            admin_holdings: Balances {
                token0: self.admin.holdings(self.vault.token0()),
                token1: self.admin.holdings(self.vault.token1()),
            },
            vault_events: self.vault.events().to_vec(),
            admin_events: self.admin.events().to_vec(),
        })
    }
}

/// Runs every step of `scenario`, recording each outcome.
pub fn run(scenario: &Scenario) -> Result<ScenarioReport> {
    let mut simulation = Simulation::new(scenario)?;
    let steps = scenario
        .steps
        .iter()
        .enumerate()
        .map(|(index, step)| match simulation.apply(step) {
            Ok(detail) => StepReport {
                index,
                action: step.action(),
                status: StepStatus::Ok,
                kind: None,
                detail,
            },
            Err(failure) => StepReport {
                index,
                action: step.action(),
                status: StepStatus::Error,
                kind: Some(failure.kind),
                detail: failure.message,
            },
        })
        .collect();
    simulation.report(scenario.name.clone(), steps)
}
