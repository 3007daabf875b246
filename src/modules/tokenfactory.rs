use crate::app::Store;
use crate::error::{Result, TestEnvError};
use crate::modules::auth::FEE_COLLECTOR_NAME;
use crate::modules::bank::{BankKeeper, DenomUnit, Metadata};
use crate::types::{validate_denom, AccAddress, Coin, Coins};
use log::{debug, info};
use serde::{Deserialize, Serialize};

pub const MODULE_NAME: &str = "tokenfactory";
pub const DENOM_PREFIX: &str = "factory";
pub const MAX_SUBDENOM_LEN: usize = 44;

const AUTHORITY_TREE: &str = "tokenfactory_authority";
const CREATOR_TREE: &str = "tokenfactory_creators";
const META_TREE: &str = "tokenfactory_meta";
const PARAMS_KEY: &[u8] = b"params";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Params {
    /// Fee charged to the creator, paid to the fee collector
    pub denom_creation_fee: Coins,
    pub denom_creation_gas_consume: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DenomAuthorityMetadata {
    pub admin: Option<AccAddress>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisDenom {
    pub denom: String,
    pub authority_metadata: DenomAuthorityMetadata,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisState {
    pub params: Params,
    pub factory_denoms: Vec<GenesisDenom>,
}

/// Split `factory/{creator}/{subdenom}` into its creator and subdenom
pub fn deconstruct_denom(denom: &str) -> Result<(AccAddress, String)> {
    let mut parts = denom.splitn(3, '/');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(DENOM_PREFIX), Some(creator), Some(subdenom)) => {
            let creator = creator.parse::<AccAddress>()?;
            Ok((creator, subdenom.to_string()))
        }
        _ => Err(TestEnvError::InvalidCoins(format!(
            "denom {denom} is not a {DENOM_PREFIX}/{{creator}}/{{subdenom}} denom"
        ))),
    }
}

fn creator_key(creator: &AccAddress, denom: &str) -> Vec<u8> {
    let mut key = creator.to_bytes().to_vec();
    key.extend_from_slice(denom.as_bytes());
    key
}

#[derive(Clone)]
pub struct TokenFactoryKeeper {
    store: Store,
    bank: BankKeeper,
}

impl TokenFactoryKeeper {
    pub fn new(store: Store, bank: BankKeeper) -> TokenFactoryKeeper {
        TokenFactoryKeeper { store, bank }
    }

    pub fn init_genesis(&self, genesis: &GenesisState) -> Result<()> {
        self.store.set(META_TREE, PARAMS_KEY, &genesis.params)?;
        for factory_denom in &genesis.factory_denoms {
            let (creator, _) = deconstruct_denom(&factory_denom.denom)?;
            self.register_denom(&creator, &factory_denom.denom, &factory_denom.authority_metadata)?;
        }
        debug!("tokenfactory genesis: {} denom(s)", genesis.factory_denoms.len());
        Ok(())
    }

    pub fn params(&self) -> Result<Params> {
        Ok(self.store.get(META_TREE, PARAMS_KEY)?.unwrap_or_default())
    }

    fn register_denom(
        &self,
        creator: &AccAddress,
        denom: &str,
        authority: &DenomAuthorityMetadata,
    ) -> Result<()> {
        self.store.set(AUTHORITY_TREE, denom.as_bytes(), authority)?;
        self.store
            .set(CREATOR_TREE, &creator_key(creator, denom), &denom.to_string())?;
        if self.bank.denom_metadata(denom)?.is_none() {
            self.bank.set_denom_metadata(&Metadata {
                denom_units: vec![DenomUnit {
                    denom: denom.to_string(),
                    exponent: 0,
                    aliases: Vec::new(),
                }],
                base: denom.to_string(),
                ..Default::default()
            })?;
        }
        Ok(())
    }

    /// Create `factory/{creator}/{subdenom}` with `creator` as its admin.
    /// Returns the new denom.
    pub fn create_denom(&self, creator: &AccAddress, subdenom: &str) -> Result<String> {
        if subdenom.len() > MAX_SUBDENOM_LEN {
            return Err(TestEnvError::InvalidCoins(format!(
                "subdenom too long, max length is {MAX_SUBDENOM_LEN} bytes"
            )));
        }
        let denom = format!("{DENOM_PREFIX}/{creator}/{subdenom}");
        validate_denom(&denom)?;
        if self.store.contains(AUTHORITY_TREE, denom.as_bytes())? {
            return Err(TestEnvError::AlreadyExists(format!("denom {denom} already exists")));
        }

        let fee = self.params()?.denom_creation_fee;
        if !fee.is_empty() {
            self.bank
                .send_coins_from_account_to_module(creator, FEE_COLLECTOR_NAME, &fee)?;
        }

        let authority = DenomAuthorityMetadata {
            admin: Some(*creator),
        };
        self.register_denom(creator, &denom, &authority)?;
        info!("created denom {denom}");
        Ok(denom)
    }

    pub fn authority_metadata(&self, denom: &str) -> Result<DenomAuthorityMetadata> {
        self.store
            .get(AUTHORITY_TREE, denom.as_bytes())?
            .ok_or_else(|| TestEnvError::NotFound(format!("denom {denom} does not exist")))
    }

    fn ensure_admin(&self, sender: &AccAddress, denom: &str) -> Result<()> {
        let authority = self.authority_metadata(denom)?;
        if authority.admin.as_ref() != Some(sender) {
            return Err(TestEnvError::Unauthorized(format!(
                "{sender} is not the admin of {denom}"
            )));
        }
        Ok(())
    }

    pub fn mint(&self, sender: &AccAddress, amount: &Coin, mint_to: &AccAddress) -> Result<()> {
        self.ensure_admin(sender, &amount.denom)?;
        let coins = Coins::from_coin(amount.clone())?;
        self.bank.mint_coins(MODULE_NAME, &coins)?;
        self.bank
            .send_coins_from_module_to_account(MODULE_NAME, mint_to, &coins)
    }

    /// Burn from the admin's own balance
    pub fn burn(&self, sender: &AccAddress, amount: &Coin, burn_from: &AccAddress) -> Result<()> {
        self.ensure_admin(sender, &amount.denom)?;
        if burn_from != sender {
            return Err(TestEnvError::Unauthorized(format!(
                "burning from {burn_from} is not allowed for {sender}"
            )));
        }
        let coins = Coins::from_coin(amount.clone())?;
        self.bank
            .send_coins_from_account_to_module(burn_from, MODULE_NAME, &coins)?;
        self.bank.burn_coins(MODULE_NAME, &coins)
    }

    pub fn change_admin(
        &self,
        sender: &AccAddress,
        denom: &str,
        new_admin: &AccAddress,
    ) -> Result<()> {
        self.ensure_admin(sender, denom)?;
        let authority = DenomAuthorityMetadata {
            admin: Some(*new_admin),
        };
        self.store.set(AUTHORITY_TREE, denom.as_bytes(), &authority)?;
        debug!("admin of {denom} changed to {new_admin}");
        Ok(())
    }

    pub fn denoms_from_creator(&self, creator: &AccAddress) -> Result<Vec<String>> {
        Ok(self
            .store
            .scan_prefix(CREATOR_TREE, creator.as_bytes())?
            .into_iter()
            .map(|(_, denom)| denom)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::auth::AccountKeeper;
    use crate::modules::module_account_permissions;
    use crate::types::{Int, ADDRESS_LEN};

    fn keeper() -> (TokenFactoryKeeper, BankKeeper, tempfile::TempDir) {
        let home = tempfile::tempdir().unwrap();
        let store = Store::open_temporary(home.path()).unwrap();
        let accounts = AccountKeeper::new(store.clone(), module_account_permissions());
        let bank = BankKeeper::new(store.clone(), accounts);
        (TokenFactoryKeeper::new(store, bank.clone()), bank, home)
    }

    fn addr(byte: u8) -> AccAddress {
        AccAddress::from_bytes([byte; ADDRESS_LEN])
    }

    #[test]
    fn test_create_mint_burn() {
        let (factory, bank, _home) = keeper();
        let creator = addr(1);
        let denom = factory.create_denom(&creator, "udenom").unwrap();
        assert_eq!(denom, format!("factory/{creator}/udenom"));
        assert_eq!(factory.denoms_from_creator(&creator).unwrap(), vec![denom.clone()]);

        factory
            .mint(&creator, &Coin::new(1_000, denom.as_str()), &creator)
            .unwrap();
        assert_eq!(bank.balance(&creator, &denom).unwrap().amount, Int::from(1_000u64));

        factory
            .burn(&creator, &Coin::new(1_000, denom.as_str()), &creator)
            .unwrap();
        assert!(bank.balance(&creator, &denom).unwrap().amount.is_zero());
        assert!(bank.supply_of(&denom).unwrap().amount.is_zero());
    }

    #[test]
    fn test_duplicate_denom_rejected() {
        let (factory, _bank, _home) = keeper();
        factory.create_denom(&addr(1), "udenom").unwrap();
        assert!(matches!(
            factory.create_denom(&addr(1), "udenom"),
            Err(TestEnvError::AlreadyExists(_))
        ));
    }

    #[test]
    fn test_only_admin_can_mint() {
        let (factory, _bank, _home) = keeper();
        let denom = factory.create_denom(&addr(1), "udenom").unwrap();
        let err = factory
            .mint(&addr(2), &Coin::new(5, denom.as_str()), &addr(2))
            .unwrap_err();
        assert!(matches!(err, TestEnvError::Unauthorized(_)));
    }

    #[test]
    fn test_change_admin() {
        let (factory, _bank, _home) = keeper();
        let denom = factory.create_denom(&addr(1), "udenom").unwrap();
        factory.change_admin(&addr(1), &denom, &addr(2)).unwrap();

        assert_eq!(factory.authority_metadata(&denom).unwrap().admin, Some(addr(2)));
        assert!(factory.change_admin(&addr(1), &denom, &addr(1)).is_err());
        factory
            .mint(&addr(2), &Coin::new(5, denom.as_str()), &addr(3))
            .unwrap();
    }

    #[test]
    fn test_deconstruct_denom() {
        let creator = addr(1);
        let (parsed, subdenom) = deconstruct_denom(&format!("factory/{creator}/a/b")).unwrap();
        assert_eq!(parsed, creator);
        assert_eq!(subdenom, "a/b");
        assert!(deconstruct_denom("untrn").is_err());
    }
}
