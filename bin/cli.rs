//! Deploy script and scenarios for the ledger.

use odra::host::{HostEnv, NoArgs};
use odra::prelude::Addressable;

use odra_cli::{
    deploy::DeployScript,
    scenario::{Args, Error, Scenario, ScenarioMetadata},
    CommandArg, ContractProvider, DeployedContractsContainer, DeployerExt, OdraCli,
};

use fy_ledger::types::Role;
use fy_ledger::{AccrualFeed, CompositeOracle, Ledger, PriceFeed};

const DEPLOY_GAS: u64 = 200_000_000_000;
const CALL_GAS: u64 = 5_000_000_000;

/// Deploys the ledger with its oracles and binds the deployer as liquidator.
pub struct LedgerDeployScript;

impl DeployScript for LedgerDeployScript {
    fn deploy(
        &self,
        env: &HostEnv,
        container: &mut DeployedContractsContainer,
    ) -> Result<(), odra_cli::deploy::Error> {
        log::info!("Deploying ledger contracts");

        let mut ledger = Ledger::load_or_deploy(env, NoArgs, container, DEPLOY_GAS)?;
        let prices = PriceFeed::load_or_deploy(env, NoArgs, container, DEPLOY_GAS)?;
        let rates = AccrualFeed::load_or_deploy(env, NoArgs, container, DEPLOY_GAS)?;
        let composite = CompositeOracle::load_or_deploy(env, NoArgs, container, DEPLOY_GAS)?;

        log::info!("Ledger: {:?}", ledger.address());
        log::info!("PriceFeed: {:?}", prices.address());
        log::info!("AccrualFeed: {:?}", rates.address());
        log::info!("CompositeOracle: {:?}", composite.address());

        let deployer = env.caller();
        if !ledger.has_role(Role::Liquidator, deployer) {
            env.set_gas(CALL_GAS);
            ledger.grant_role(Role::Liquidator, deployer);
            log::info!("Granted Liquidator to {:?}", deployer);
        }

        Ok(())
    }
}

/// Reports the roles held by the caller.
pub struct CheckRolesScenario;

impl Scenario for CheckRolesScenario {
    fn args(&self) -> Vec<CommandArg> {
        vec![]
    }

    fn run(
        &self,
        env: &HostEnv,
        container: &DeployedContractsContainer,
        _args: Args,
    ) -> Result<(), Error> {
        let ledger = container.contract_ref::<Ledger>(env)?;
        let caller = env.caller();

        log::info!("Roles of {:?}", caller);
        log::info!("Admin: {}", ledger.has_role(Role::Admin, caller));
        log::info!("Liquidator: {}", ledger.has_role(Role::Liquidator, caller));

        Ok(())
    }
}

impl ScenarioMetadata for CheckRolesScenario {
    const NAME: &'static str = "check-roles";
    const DESCRIPTION: &'static str = "Reports the ledger roles held by the caller";
}

/// Main function
pub fn main() {
    OdraCli::new()
        .about("CLI tool for the fixed-maturity debt ledger")
        .deploy(LedgerDeployScript)
        .contract::<Ledger>()
        .contract::<PriceFeed>()
        .contract::<AccrualFeed>()
        .contract::<CompositeOracle>()
        .scenario(CheckRolesScenario)
        .build()
        .run();
}
