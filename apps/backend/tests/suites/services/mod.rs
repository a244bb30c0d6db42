mod hub;
mod ledger;
