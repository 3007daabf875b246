use crate::error::Result;
use crate::testenv::TestEnv;
use crate::types::{AccAddress, Coin, Coins};
use crate::wallet::SigningAccount;

/// Bank operations against a harness
pub struct Bank<'a> {
    env: &'a TestEnv,
}

impl<'a> Bank<'a> {
    pub fn new(env: &'a TestEnv) -> Bank<'a> {
        Bank { env }
    }

    pub fn send(&self, signer: &SigningAccount, to: &AccAddress, coins: &Coins) -> Result<()> {
        self.env
            .app
            .bank_keeper
            .send_coins(&signer.address(), to, coins)
    }

    pub fn balance(&self, address: &AccAddress, denom: &str) -> Result<Coin> {
        self.env.app.bank_keeper.balance(address, denom)
    }

    pub fn all_balances(&self, address: &AccAddress) -> Result<Coins> {
        self.env.app.bank_keeper.all_balances(address)
    }

    pub fn total_supply(&self) -> Result<Coins> {
        self.env.app.bank_keeper.total_supply()
    }

    pub fn supply_of(&self, denom: &str) -> Result<Coin> {
        self.env.app.bank_keeper.supply_of(denom)
    }
}

#[cfg(test)]
mod tests {
    use crate::config::TestEnvConfig;
    use crate::error::TestEnvError;
    use crate::testenv::TestEnv;
    use crate::types::{Coin, Coins};

    #[test]
    fn test_send_between_accounts() {
        let home = tempfile::tempdir().unwrap();
        let env = TestEnv::with_node_home(home.path(), TestEnvConfig::default()).unwrap();
        let coins = Coins::from_coin(Coin::new(1_000, "untrn")).unwrap();
        let alice = env.init_account(&coins).unwrap();
        let bob = env.init_account(&Coins::empty()).unwrap();

        let bank = env.bank();
        let part = Coins::from_coin(Coin::new(400, "untrn")).unwrap();
        bank.send(&alice, &bob.address(), &part).unwrap();

        assert_eq!(bank.balance(&alice.address(), "untrn").unwrap(), Coin::new(600, "untrn"));
        assert_eq!(bank.all_balances(&bob.address()).unwrap(), part);

        let too_much = Coins::from_coin(Coin::new(601, "untrn")).unwrap();
        assert!(matches!(
            bank.send(&alice, &bob.address(), &too_much),
            Err(TestEnvError::InsufficientFunds { .. })
        ));
    }
}
