use crate::error::Result;
use crate::modules::tokenfactory::{DenomAuthorityMetadata, Params};
use crate::testenv::TestEnv;
use crate::types::{AccAddress, Coin};
use crate::wallet::SigningAccount;

/// Token factory operations against a harness. The signer acts as sender.
pub struct TokenFactory<'a> {
    env: &'a TestEnv,
}

impl<'a> TokenFactory<'a> {
    pub fn new(env: &'a TestEnv) -> TokenFactory<'a> {
        TokenFactory { env }
    }

    pub fn create_denom(&self, signer: &SigningAccount, subdenom: &str) -> Result<String> {
        self.env
            .app
            .tokenfactory_keeper
            .create_denom(&signer.address(), subdenom)
    }

    pub fn mint(&self, signer: &SigningAccount, amount: &Coin, mint_to: &AccAddress) -> Result<()> {
        self.env
            .app
            .tokenfactory_keeper
            .mint(&signer.address(), amount, mint_to)
    }

    pub fn burn(
        &self,
        signer: &SigningAccount,
        amount: &Coin,
        burn_from: &AccAddress,
    ) -> Result<()> {
        self.env
            .app
            .tokenfactory_keeper
            .burn(&signer.address(), amount, burn_from)
    }

    pub fn change_admin(
        &self,
        signer: &SigningAccount,
        denom: &str,
        new_admin: &AccAddress,
    ) -> Result<()> {
        self.env
            .app
            .tokenfactory_keeper
            .change_admin(&signer.address(), denom, new_admin)
    }

    pub fn denoms_from_creator(&self, creator: &AccAddress) -> Result<Vec<String>> {
        self.env.app.tokenfactory_keeper.denoms_from_creator(creator)
    }

    pub fn authority_metadata(&self, denom: &str) -> Result<DenomAuthorityMetadata> {
        self.env.app.tokenfactory_keeper.authority_metadata(denom)
    }

    pub fn params(&self) -> Result<Params> {
        self.env.query_params::<Params>()
    }
}
