//! Noyau de saisie + évaluation
//!
//! Organisation interne :
//! - format.rs     : rendu canonique d’un f64 (décimales plafonnées)
//! - jetons.rs     : jetons typés + flux {jetons, tampon}
//! - saisie.rs     : contrôleur (une action à la fois) + registre mémoire
//! - eval.rs       : validation structurelle + pipeline d’évaluation
//! - rpn.rs        : shunting-yard + réduction RPN
//! - historique.rs : journal des calculs + contrat de persistance
//! - reglages.rs   : réglages (reglages.toml)
//! - erreur.rs     : taxonomie des erreurs

pub mod erreur;
pub mod eval;
pub mod format;
pub mod historique;
pub mod jetons;
pub mod reglages;
pub mod rpn;
pub mod saisie;

#[cfg(test)]
mod tests_scientifiques;


// API publique minimale
pub use erreur::ErreurCalc;
pub use format::format_nombre_avec;
pub use historique::{EntreeHistorique, StockageCle, StockageMemoire};
pub use jetons::{Cote, Operateur};
pub use reglages::Reglages;
pub use saisie::{Action, ActionMemoire, Controleur, Fonction};
