// src/noyau/rpn.rs
//
// Shunting-yard -> RPN -> valeur
// Objectif:
// - Convertir une suite de Tok (déjà validée) en RPN (postfix)
// - Puis réduire la RPN sur une pile de f64
//
// Règles:
// - × ÷ avant + −, tous associatifs à gauche
// - les parenthèses lient le plus fort
// - ÷ 0 échoue au moment précis de cette division

use super::erreur::ErreurCalc;
use super::jetons::{Cote, Operateur, Tok};

/// Convertit une suite de jetons en RPN (notation polonaise inversée).
///
/// Exemple:
///   tokens: [Num(2), Op(+), Num(3), Op(×), Num(4)]
///   rpn:    [Num(2), Num(3), Num(4), Op(×), Op(+)]
pub fn to_rpn(tokens: &[Tok]) -> Result<Vec<Tok>, ErreurCalc> {
    let mut out: Vec<Tok> = Vec::with_capacity(tokens.len());
    let mut ops: Vec<Tok> = Vec::new();

    for tok in tokens.iter().copied() {
        match tok {
            Tok::Num(_) => out.push(tok),

            Tok::Par(Cote::Gauche) => ops.push(tok),

            Tok::Par(Cote::Droite) => {
                // dépile jusqu’à '('
                loop {
                    match ops.pop() {
                        Some(Tok::Par(Cote::Gauche)) => break,
                        Some(top) => out.push(top),
                        None => return Err(ErreurCalc::UnbalancedParentheses),
                    }
                }
            }

            Tok::Op(op) => {
                // associatif à gauche : on sort tout opérateur de précédence >=
                while let Some(Tok::Op(top)) = ops.last() {
                    if top.precedence() >= op.precedence() {
                        out.push(Tok::Op(*top));
                        ops.pop();
                    } else {
                        break;
                    }
                }
                ops.push(tok);
            }
        }
    }

    // vide la pile ops
    while let Some(op) = ops.pop() {
        if matches!(op, Tok::Par(_)) {
            return Err(ErreurCalc::UnbalancedParentheses);
        }
        out.push(op);
    }

    Ok(out)
}

/// Réduit une RPN en valeur.
pub fn eval_rpn(rpn: &[Tok]) -> Result<f64, ErreurCalc> {
    let mut st: Vec<f64> = Vec::with_capacity(rpn.len());

    for tok in rpn.iter().copied() {
        match tok {
            Tok::Num(v) => st.push(v),

            Tok::Op(op) => {
                let b = st.pop().ok_or(ErreurCalc::MalformedExpression)?;
                let a = st.pop().ok_or(ErreurCalc::MalformedExpression)?;
                st.push(applique(op, a, b)?);
            }

            Tok::Par(_) => return Err(ErreurCalc::MalformedExpression),
        }
    }

    if st.len() != 1 {
        return Err(ErreurCalc::MalformedExpression);
    }
    st.pop().ok_or(ErreurCalc::NoOperand)
}

fn applique(op: Operateur, a: f64, b: f64) -> Result<f64, ErreurCalc> {
    Ok(match op {
        Operateur::Plus => a + b,
        Operateur::Moins => a - b,
        Operateur::Fois => a * b,
        Operateur::Divise => {
            if b == 0.0 {
                return Err(ErreurCalc::DivisionByZero);
            }
            a / b
        }
    })
}
