//! file: core/src/lower/declare_builtins.rs
//! description: name tables mapping host members to criteria functions.
//!
//! Three closed tables: method name -> function kind, (type, member) ->
//! accessor function kind, and conversion target -> conversion function.
//!
use crate::criteria::FunctionOperatorType;
use crate::expr::ExprType;

/// Host method names whose criteria spelling differs.
fn renamed_method(name: &str) -> Option<FunctionOperatorType> {
    use FunctionOperatorType::*;
    let kind = match name {
        "ToLower" => Lower,
        "ToUpper" => Upper,
        "ToString" => ToStr,
        "AddMilliseconds" => AddMilliSeconds,
        "Add" => AddTimeSpan,
        "Atan" => Atn,
        "Atan2" => Atn2,
        "ToChar" => Char,
        "Pow" => Power,
        "Sqrt" => Sqr,
        "ToSingle" => ToFloat,
        "ToInt32" => ToInt,
        "ToInt64" => ToLong,
        _ => return None,
    };
    Some(kind)
}

/// Built-in function kinds by their criteria-language name.
pub fn builtin_by_name(name: &str) -> Option<FunctionOperatorType> {
    use FunctionOperatorType::*;
    let kind = match name {
        "Iif" => Iif,
        "IsNull" => IsNull,
        "IsNullOrEmpty" => IsNullOrEmpty,
        "Trim" => Trim,
        "Len" => Len,
        "Substring" => Substring,
        "Upper" => Upper,
        "Lower" => Lower,
        "Concat" => Concat,
        "Ascii" => Ascii,
        "Char" => Char,
        "ToStr" => ToStr,
        "Replace" => Replace,
        "Reverse" => Reverse,
        "Insert" => Insert,
        "CharIndex" => CharIndex,
        "Remove" => Remove,
        "PadLeft" => PadLeft,
        "PadRight" => PadRight,
        "StartsWith" => StartsWith,
        "EndsWith" => EndsWith,
        "Contains" => Contains,
        "Abs" => Abs,
        "Sqr" => Sqr,
        "Cos" => Cos,
        "Sin" => Sin,
        "Atn" => Atn,
        "Exp" => Exp,
        "Log" => Log,
        "Rnd" => Rnd,
        "Tan" => Tan,
        "Power" => Power,
        "Sign" => Sign,
        "Round" => Round,
        "Ceiling" => Ceiling,
        "Floor" => Floor,
        "Max" => Max,
        "Min" => Min,
        "Acos" => Acos,
        "Asin" => Asin,
        "Atn2" => Atn2,
        "BigMul" => BigMul,
        "Cosh" => Cosh,
        "Log10" => Log10,
        "Sinh" => Sinh,
        "Tanh" => Tanh,
        "ToInt" => ToInt,
        "ToLong" => ToLong,
        "ToFloat" => ToFloat,
        "ToDouble" => ToDouble,
        "ToDecimal" => ToDecimal,
        "GetDate" => GetDate,
        "GetDay" => GetDay,
        "GetDayOfWeek" => GetDayOfWeek,
        "GetDayOfYear" => GetDayOfYear,
        "GetHour" => GetHour,
        "GetMilliSecond" => GetMilliSecond,
        "GetMinute" => GetMinute,
        "GetMonth" => GetMonth,
        "GetSecond" => GetSecond,
        "GetTimeOfDay" => GetTimeOfDay,
        "GetYear" => GetYear,
        "AddDays" => AddDays,
        "AddHours" => AddHours,
        "AddMilliSeconds" => AddMilliSeconds,
        "AddMinutes" => AddMinutes,
        "AddMonths" => AddMonths,
        "AddSeconds" => AddSeconds,
        "AddTicks" => AddTicks,
        "AddTimeSpan" => AddTimeSpan,
        "AddYears" => AddYears,
        "DateDiffDay" => DateDiffDay,
        "DateDiffHour" => DateDiffHour,
        "DateDiffMilliSecond" => DateDiffMilliSecond,
        "DateDiffMinute" => DateDiffMinute,
        "DateDiffMonth" => DateDiffMonth,
        "DateDiffSecond" => DateDiffSecond,
        "DateDiffTick" => DateDiffTick,
        "DateDiffYear" => DateDiffYear,
        "Now" => Now,
        "Today" => Today,
        "UtcNow" => UtcNow,
        _ => return None,
    };
    Some(kind)
}

/// Function kind for a called method name: renamed host methods first,
/// then names spelled the same in both languages.
pub fn function_for_method(name: &str) -> Option<FunctionOperatorType> {
    renamed_method(name).or_else(|| builtin_by_name(name))
}

/// Accessor function for `member` read off a value of type `owner`.
pub fn member_accessor(owner: &ExprType, member: &str) -> Option<FunctionOperatorType> {
    use FunctionOperatorType::*;
    match owner.underlying() {
        ExprType::String if member == "Length" => Some(Len),
        ExprType::DateTime => {
            let kind = match member {
                "Date" => GetDate,
                "Day" => GetDay,
                "DayOfWeek" => GetDayOfWeek,
                "DayOfYear" => GetDayOfYear,
                "Hour" => GetHour,
                "Millisecond" => GetMilliSecond,
                "Minute" => GetMinute,
                "Month" => GetMonth,
                "Second" => GetSecond,
                "TimeOfDay" => GetTimeOfDay,
                "Year" => GetYear,
                _ => return None,
            };
            Some(kind)
        }
        _ => None,
    }
}

/// Conversion function applied by an explicit cast to `target`.
pub fn conversion_function(target: &ExprType) -> Option<FunctionOperatorType> {
    use FunctionOperatorType::*;
    match target.underlying() {
        ExprType::Char => Some(Char),
        ExprType::Decimal => Some(ToDecimal),
        ExprType::Double => Some(ToDouble),
        ExprType::Single => Some(ToFloat),
        ExprType::Int32 => Some(ToInt),
        ExprType::Int64 => Some(ToLong),
        _ => None,
    }
}
