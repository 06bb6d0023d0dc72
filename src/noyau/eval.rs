//! Noyau — évaluation (fonction pure d’une suite de jetons)
//!
//! valider (balance -> au moins un nombre -> grammaire) -> RPN -> réduction -> fini ?
//!
//! Le tampon doit déjà avoir été engagé par l’appelant.

use super::erreur::ErreurCalc;
use super::jetons::{Cote, Tok};
use super::rpn::{eval_rpn, to_rpn};

/// API publique : évalue une suite de jetons finalisée.
pub fn evaluer(tokens: &[Tok]) -> Result<f64, ErreurCalc> {
    valider(tokens)?;

    let rpn = to_rpn(tokens)?;
    let v = eval_rpn(&rpn)?;

    if !v.is_finite() {
        return Err(ErreurCalc::NonFiniteResult);
    }
    Ok(v)
}

/// Validation structurelle, dans l’ordre :
/// 1. balance des parenthèses (")" orpheline = échec immédiat)
/// 2. au moins un Num
/// 3. grammaire nombre/opérateur alternée, niveau par niveau
pub fn valider(tokens: &[Tok]) -> Result<(), ErreurCalc> {
    // 1) balance
    let mut ouvertes: i64 = 0;
    for t in tokens {
        match t {
            Tok::Par(Cote::Gauche) => ouvertes += 1,
            Tok::Par(Cote::Droite) => {
                if ouvertes <= 0 {
                    return Err(ErreurCalc::UnbalancedParentheses);
                }
                ouvertes -= 1;
            }
            Tok::Num(_) | Tok::Op(_) => {}
        }
    }
    if ouvertes != 0 {
        return Err(ErreurCalc::UnbalancedParentheses);
    }

    // 2) au moins un nombre
    if !tokens.iter().any(|t| matches!(t, Tok::Num(_))) {
        return Err(ErreurCalc::NoOperand);
    }

    // 3) grammaire : on attend une valeur (Num ou "(") ou un lien (Op ou ")")
    let mut attend_valeur = true;
    let mut precedent: Option<&Tok> = None;

    for t in tokens {
        match t {
            Tok::Num(_) => {
                if !attend_valeur {
                    // deux opérandes collés : "2 3", ") 4"
                    return Err(ErreurCalc::MalformedExpression);
                }
                attend_valeur = false;
            }
            Tok::Op(_) => {
                if attend_valeur {
                    return Err(match precedent {
                        None => ErreurCalc::LeadingOperator,
                        Some(_) => ErreurCalc::MalformedExpression,
                    });
                }
                attend_valeur = true;
            }
            Tok::Par(Cote::Gauche) => {
                if !attend_valeur {
                    // multiplication implicite "2 (" : non supportée
                    return Err(ErreurCalc::MalformedExpression);
                }
            }
            Tok::Par(Cote::Droite) => {
                if attend_valeur {
                    // "( )" ou "+ )"
                    return Err(ErreurCalc::MalformedExpression);
                }
            }
        }
        precedent = Some(t);
    }

    if matches!(precedent, Some(Tok::Op(_))) {
        return Err(ErreurCalc::TrailingOperator);
    }
    Ok(())
}
